//! Typed customer identity extracted from raw row cells

use std::fmt;

use crate::sheet::CellValue;
use crate::store::NewCustomer;

/// Validated first name, last name and email of one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerIdentity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl CustomerIdentity {
    /// Validate raw cells; names may be blank, the email may not
    pub fn from_cells(
        first_name: &CellValue,
        last_name: &CellValue,
        email: &CellValue,
    ) -> Result<Self, String> {
        let email = email.as_text();
        validate_email(&email)?;

        Ok(Self {
            first_name: first_name.as_text(),
            last_name: last_name.as_text(),
            email,
        })
    }

    /// Key used for in-run de-duplication
    pub fn email_key(&self) -> String {
        self.email.to_lowercase()
    }

    pub fn to_new_customer(&self) -> NewCustomer {
        NewCustomer {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

impl fmt::Display for CustomerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            write!(f, "<{}>", self.email)
        } else {
            write!(f, "{} <{}>", name, self.email)
        }
    }
}

fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("email is empty".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(format!("email '{}' contains whitespace", email));
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(format!("'{}' is not a valid email address", email)),
    }
}
