//! The interactive menu loop: login, command dispatch, and field-by-field
//! data entry. Everything here is thin glue over [`SyllabusService`];
//! no domain rules live in this module.

use std::{
  collections::BTreeMap,
  io::{self, Write as _},
};

use sylla_core::{
  accounts,
  record::{FieldValue, SyllabusRecord},
  service::SyllabusService,
  store::SyllabusStore,
  user::{Role, User},
};
use uuid::Uuid;

// ─── Prompting ───────────────────────────────────────────────────────────────

/// Print `label`, read one line from stdin, and return it trimmed.
pub fn prompt(label: &str) -> anyhow::Result<String> {
  print!("{label}");
  io::stdout().flush()?;
  let mut line = String::new();
  io::stdin().read_line(&mut line)?;
  Ok(line.trim().to_string())
}

/// Interpret typed input as the most specific field value it parses as.
fn parse_field_value(raw: &str) -> FieldValue {
  if let Ok(b) = raw.parse::<bool>() {
    return FieldValue::Bool(b);
  }
  if let Ok(n) = raw.parse::<f64>() {
    return FieldValue::Number(n);
  }
  FieldValue::Text(raw.to_string())
}

/// Key/value entry loop shared by create and update. A blank key or the
/// word `done` ends the loop; existing keys are overwritten.
fn read_content_fields(
  content: &mut BTreeMap<String, FieldValue>,
) -> anyhow::Result<()> {
  println!("Enter content fields (key then value). Blank key or 'done' to finish.");
  loop {
    let key = prompt("Key: ")?;
    if key.is_empty() || key == "done" {
      return Ok(());
    }
    let value = prompt("Value: ")?;
    content.insert(key, parse_field_value(&value));
  }
}

// ─── Session flow ────────────────────────────────────────────────────────────

enum Flow {
  Logout,
  Quit,
}

/// Top-level loop: authenticate, then dispatch menu commands until logout
/// or quit.
pub fn run<S: SyllabusStore>(
  service: &mut SyllabusService<S>,
) -> anyhow::Result<()> {
  loop {
    println!("\n=== LOGIN ===");
    for user in &service.repository().users {
      let department = user
        .role
        .department()
        .map(|d| format!(" [Dept: {d}]"))
        .unwrap_or_default();
      println!("{}. {} ({}){department}", user.id, user.name, user.role.describe());
    }

    let id = prompt("User id (blank to quit): ")?;
    if id.is_empty() {
      return Ok(());
    }
    let password = prompt("Password: ")?;

    let user = match accounts::authenticate(service.repository(), &id, &password)
    {
      Ok(user) => user.clone(),
      Err(err) => {
        println!("{err}");
        continue;
      }
    };

    service.repository().audit(&format!("Login: {}", user.name));
    println!("Logged in as {}", user.name);

    match session(service, &user)? {
      Flow::Logout => continue,
      Flow::Quit => return Ok(()),
    }
  }
}

fn session<S: SyllabusStore>(
  service: &mut SyllabusService<S>,
  user: &User,
) -> anyhow::Result<Flow> {
  loop {
    println!("\n=== MENU (User: {}) ===", user.name);
    println!("1. List syllabi");
    println!("2. View syllabus");
    println!("3. View history");
    println!("4. Create syllabus");
    println!("5. Update syllabus");
    println!("6. Delete syllabus");
    println!("7. Revert to commit");
    println!("8. Subscribe to course pattern");
    println!("9. Manage users");
    println!("0. Logout");
    println!("q. Quit");

    match prompt("Choice: ")?.as_str() {
      "1" => list(service),
      "2" => view(service)?,
      "3" => history(service)?,
      "4" => create(service, user)?,
      "5" => update(service, user)?,
      "6" => delete(service, user)?,
      "7" => revert(service, user)?,
      "8" => subscribe(service, user)?,
      "9" => manage_users(service, user)?,
      "0" => {
        println!("Logging out {}...", user.name);
        return Ok(Flow::Logout);
      }
      "q" => return Ok(Flow::Quit),
      other => println!("Unknown choice: {other}"),
    }
  }
}

// ─── Commands ────────────────────────────────────────────────────────────────

fn list<S: SyllabusStore>(service: &SyllabusService<S>) {
  println!("\n--- Syllabi ---");
  let all = service.get_all();
  if all.is_empty() {
    println!("(none)");
  }
  for record in all {
    println!("{record}");
  }
}

fn view<S: SyllabusStore>(service: &SyllabusService<S>) -> anyhow::Result<()> {
  let code = prompt("Course code: ")?;
  match service.get(&code) {
    None => println!("Not found."),
    Some(record) => {
      println!("{record}");
      for (key, value) in &record.content {
        println!("  {key}: {value}");
      }
    }
  }
  Ok(())
}

fn history<S: SyllabusStore>(
  service: &SyllabusService<S>,
) -> anyhow::Result<()> {
  let code = prompt("Course code: ")?;
  let commits = service.history(&code);
  if commits.is_empty() {
    println!("No history for that course code.");
    return Ok(());
  }
  for commit in commits {
    println!(
      "\ncommit {} by {} at {}",
      commit.commit_id, commit.author_name, commit.recorded_at
    );
    println!("message: {}", commit.message);
    for line in commit.diff.lines() {
      println!("  {line}");
    }
  }
  Ok(())
}

fn create<S: SyllabusStore>(
  service: &mut SyllabusService<S>,
  user: &User,
) -> anyhow::Result<()> {
  let code = prompt("Course code (e.g. CE221): ")?;
  let title = prompt("Title: ")?;
  let semester = prompt("Semester: ")?;

  let mut record = SyllabusRecord::new(code.as_str(), title, semester);
  read_content_fields(&mut record.content)?;

  match service.create(user, record) {
    Ok(commit) => {
      println!("Syllabus {} created successfully.", commit.snapshot.course_code)
    }
    Err(err) => println!("{err}"),
  }
  Ok(())
}

fn update<S: SyllabusStore>(
  service: &mut SyllabusService<S>,
  user: &User,
) -> anyhow::Result<()> {
  let code = prompt("Course code to update: ")?;
  let Some(existing) = service.get(&code).cloned() else {
    println!("Not found.");
    return Ok(());
  };

  println!("Leave fields blank to keep the current value.");

  let mut new_version = existing.clone();
  let title = prompt(&format!("New title [{}]: ", existing.title))?;
  if !title.is_empty() {
    new_version.title = title;
  }
  let semester = prompt(&format!("New semester [{}]: ", existing.semester))?;
  if !semester.is_empty() {
    new_version.semester = semester;
  }
  if prompt("Edit content? (y/n): ")? == "y" {
    read_content_fields(&mut new_version.content)?;
  }

  let message = prompt("Commit message (why are you changing this?): ")?;

  match service.update(user, &code, new_version, &message) {
    Ok(_) => println!("Syllabus {} updated successfully.", existing.course_code),
    Err(err) => println!("{err}"),
  }
  Ok(())
}

fn delete<S: SyllabusStore>(
  service: &mut SyllabusService<S>,
  user: &User,
) -> anyhow::Result<()> {
  let code = prompt("Course code: ")?;
  match service.delete(user, &code) {
    Ok(true) => println!("Syllabus deleted."),
    Ok(false) => println!("No syllabus with that code; nothing to do."),
    Err(err) => println!("{err}"),
  }
  Ok(())
}

fn revert<S: SyllabusStore>(
  service: &mut SyllabusService<S>,
  user: &User,
) -> anyhow::Result<()> {
  let raw = prompt("Commit id: ")?;
  let commit_id = match raw.parse::<Uuid>() {
    Ok(id) => id,
    Err(_) => {
      println!("Not a valid commit id.");
      return Ok(());
    }
  };

  match service.revert(user, commit_id) {
    Ok(commit) => println!(
      "Reverted {}; new commit {}.",
      commit.snapshot.course_code, commit.commit_id
    ),
    Err(err) => println!("{err}"),
  }
  Ok(())
}

fn subscribe<S: SyllabusStore>(
  service: &mut SyllabusService<S>,
  user: &User,
) -> anyhow::Result<()> {
  // Subscribing on behalf of another observer is allowed by contract.
  let observer = prompt(&format!("Observer user id [{}]: ", user.id))?;
  let observer = if observer.is_empty() { user.id.clone() } else { observer };
  let pattern = prompt("Course pattern (e.g. CE or CE221): ")?;

  match service.subscribe(&observer, &pattern) {
    Ok(()) => println!("User {observer} subscribed to {pattern}"),
    Err(err) => println!("{err}"),
  }
  Ok(())
}

// ─── User management ─────────────────────────────────────────────────────────

fn manage_users<S: SyllabusStore>(
  service: &mut SyllabusService<S>,
  actor: &User,
) -> anyhow::Result<()> {
  println!("\n--- Users ---");
  for user in &service.repository().users {
    let department = user
      .role
      .department()
      .map(|d| format!(", Dept: {d}"))
      .unwrap_or_default();
    println!("{}. {} ({}{department})", user.id, user.name, user.role.describe());
  }

  match prompt("c. Create user / d. Delete user / other: back: ")?.as_str() {
    "c" => create_user(service, actor),
    "d" => delete_user(service, actor),
    _ => Ok(()),
  }
}

fn create_user<S: SyllabusStore>(
  service: &mut SyllabusService<S>,
  actor: &User,
) -> anyhow::Result<()> {
  let name = prompt("Name: ")?;
  let password = prompt("Password: ")?;

  let role = match prompt("Role (instructor/head/admin): ")?
    .to_lowercase()
    .as_str()
  {
    "instructor" => {
      let department = prompt("Department (e.g. CE): ")?;
      Role::Instructor { department }
    }
    "head" | "hod" => {
      let department = prompt("Department (e.g. CE): ")?;
      Role::HeadOfDepartment { department }
    }
    "admin" => Role::Admin,
    other => {
      println!("Invalid role type: {other}");
      return Ok(());
    }
  };

  match accounts::create_user(
    service.repository_mut(),
    actor,
    &name,
    &password,
    role,
  ) {
    Ok(user) => println!("User {} created with id {}.", user.name, user.id),
    Err(err) => println!("{err}"),
  }
  Ok(())
}

fn delete_user<S: SyllabusStore>(
  service: &mut SyllabusService<S>,
  actor: &User,
) -> anyhow::Result<()> {
  let id = prompt("User id to delete: ")?;
  match accounts::delete_user(service.repository_mut(), actor, &id) {
    Ok(()) => println!("User {id} deleted."),
    Err(err) => println!("{err}"),
  }
  Ok(())
}
