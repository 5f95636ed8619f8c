//! Simulated delivery channels.
//!
//! Both channels print to stdout; no mail or SMS gateway is involved.
//! Real transports would slot in behind the same trait.

use sylla_core::notify::DeliveryChannel;

pub struct EmailChannel;

impl DeliveryChannel for EmailChannel {
  fn label(&self) -> &str { "email" }

  fn send(
    &self,
    recipient: &str,
    message: &str,
  ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("[Email] Sent to {recipient}: {message} (simulated)");
    Ok(())
  }
}

pub struct SmsChannel;

impl DeliveryChannel for SmsChannel {
  fn label(&self) -> &str { "sms" }

  fn send(
    &self,
    recipient: &str,
    message: &str,
  ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("[SMS] Sent to {recipient}: {message} (simulated)");
    Ok(())
  }
}
