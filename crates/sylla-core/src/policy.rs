//! Authorization policy — pure decision functions over (role, course code).

use crate::{record::CourseCode, user::{Role, User}};

/// Whether `user` may create or edit the syllabus for `course_code`.
///
/// Admins and heads of department may touch any course. Instructors are
/// scoped to their own department: the normalized course code must start
/// with the instructor's department code, compared case-insensitively.
pub fn can_create_or_edit(user: &User, course_code: &CourseCode) -> bool {
  match &user.role {
    Role::Admin => true,
    Role::HeadOfDepartment { .. } => true,
    Role::Instructor { department } => {
      department_prefix_matches(course_code, department)
    }
  }
}

/// Whether `user` may delete syllabi.
///
/// Deletion is deliberately not scoped by department: every role, including
/// any instructor, may delete any syllabus. Documented policy choice.
pub fn can_delete(user: &User) -> bool {
  match &user.role {
    Role::Admin => true,
    Role::HeadOfDepartment { .. } => true,
    Role::Instructor { .. } => true,
  }
}

fn department_prefix_matches(code: &CourseCode, department: &str) -> bool {
  match code.as_str().get(..department.len()) {
    Some(prefix) => prefix.eq_ignore_ascii_case(department),
    None => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user(role: Role) -> User {
    User {
      id:            "1".into(),
      name:          "Test".into(),
      password_hash: String::new(),
      role,
    }
  }

  #[test]
  fn instructor_limited_to_own_department() {
    let instructor = user(Role::Instructor { department: "CE".into() });
    assert!(can_create_or_edit(&instructor, &CourseCode::new("CE221")));
    assert!(!can_create_or_edit(&instructor, &CourseCode::new("SE101")));
  }

  #[test]
  fn instructor_prefix_match_is_case_insensitive() {
    // Codes normalize to uppercase; the department may be stored lowercase.
    let instructor = user(Role::Instructor { department: "ce".into() });
    assert!(can_create_or_edit(&instructor, &CourseCode::new("ce221")));
    assert!(can_create_or_edit(&instructor, &CourseCode::new("CE221")));
    assert!(!can_create_or_edit(&instructor, &CourseCode::new("SE101")));
  }

  #[test]
  fn head_of_department_edits_any_course() {
    let head = user(Role::HeadOfDepartment { department: "CE".into() });
    assert!(can_create_or_edit(&head, &CourseCode::new("CE221")));
    assert!(can_create_or_edit(&head, &CourseCode::new("SE101")));
  }

  #[test]
  fn admin_edits_any_course() {
    let admin = user(Role::Admin);
    assert!(can_create_or_edit(&admin, &CourseCode::new("CE221")));
    assert!(can_create_or_edit(&admin, &CourseCode::new("SE101")));
  }

  #[test]
  fn every_role_may_delete() {
    assert!(can_delete(&user(Role::Instructor { department: "CE".into() })));
    assert!(can_delete(&user(Role::HeadOfDepartment {
      department: "CE".into()
    })));
    assert!(can_delete(&user(Role::Admin)));
  }

  #[test]
  fn department_longer_than_code_never_matches() {
    let instructor = user(Role::Instructor { department: "CENG".into() });
    assert!(!can_create_or_edit(&instructor, &CourseCode::new("CE2")));
  }
}
