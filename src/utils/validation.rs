// Field checks shared by the student and event services.

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.contains(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .rsplit_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    .unwrap_or(false)
        }
        None => false,
    }
}

/// 10-15 digits, optionally prefixed with `+`. Spaces and dashes are ignored.
pub fn is_valid_phone(phone: &str) -> bool {
    let trimmed = phone.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = digits.chars().filter(|c| *c != ' ' && *c != '-').collect();
    (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

pub fn is_valid_roll_number(roll: &str) -> bool {
    let roll = roll.trim();
    !roll.is_empty()
        && roll.len() <= 32
        && roll
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '/')
}

/// Pushes an error when a required text field is blank or too long.
pub fn check_required(errors: &mut Vec<String>, field: &str, value: &str, max_len: usize) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(format!("{} is required", field));
    } else if value.chars().count() > max_len {
        errors.push(format!("{} must be at most {} characters", field, max_len));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails() {
        assert!(is_valid_email("asha.k@college.edu"));
        assert!(is_valid_email(" padded@x.io "));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@college.edu"));
        assert!(!is_valid_email("a@b"));
        assert!(is_valid_email("a@b.c"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@c.com"));
    }

    #[test]
    fn phones() {
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("+91 98765-43210"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("98765abc10"));
    }

    #[test]
    fn roll_numbers() {
        assert!(is_valid_roll_number("21CS001"));
        assert!(is_valid_roll_number("2021/CS-14"));
        assert!(!is_valid_roll_number(""));
        assert!(!is_valid_roll_number("21 CS 001"));
    }

    #[test]
    fn required_fields() {
        let mut errors = Vec::new();
        check_required(&mut errors, "name", "  ", 10);
        check_required(&mut errors, "title", "abcdefghijkl", 10);
        check_required(&mut errors, "location", "Hall A", 10);
        assert_eq!(
            errors,
            vec!["name is required".to_string(), "title must be at most 10 characters".to_string()]
        );
    }
}
