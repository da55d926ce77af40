//! Validation rules for identifiers that reach a request path.
//!
//! Every resource name, repository identifier, branch and file path passes
//! through one of these functions before it is formatted into a URL for
//! either remote API.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

// ============================================================================
// Patterns
// ============================================================================

static RESOURCE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("Invalid regex"));

static REPO_IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("Invalid regex"));

static PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-/]+$").expect("Invalid regex"));

// ============================================================================
// Resource Names
// ============================================================================

/// Trims a resource name and checks it against `^[A-Za-z0-9_]+$`.
///
/// Returns the trimmed name on success.
pub fn sanitize_resource_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if RESOURCE_NAME_RE.is_match(name) {
        Ok(name.to_string())
    } else {
        Err(ValidationError::ResourceName(raw.to_string()))
    }
}

/// Returns true if the name is already in sanitized form.
pub fn is_valid_resource_name(name: &str) -> bool {
    RESOURCE_NAME_RE.is_match(name)
}

// ============================================================================
// Repository Identifiers
// ============================================================================

/// Validates a repository owner or repository name.
pub fn validate_repo_identifier(ident: &str) -> Result<(), ValidationError> {
    if ident == "." || ident == ".." || !REPO_IDENT_RE.is_match(ident) {
        return Err(ValidationError::Repository(ident.to_string()));
    }
    Ok(())
}

/// Validates a branch name.
pub fn validate_branch(branch: &str) -> Result<(), ValidationError> {
    if !PATH_RE.is_match(branch)
        || branch.starts_with('/')
        || branch.starts_with('-')
        || branch.ends_with('/')
        || branch.contains("..")
        || branch.contains("//")
    {
        return Err(ValidationError::Branch(branch.to_string()));
    }
    Ok(())
}

/// Validates a file path inside the repository.
///
/// Rejects leading separators, empty segments, `.`/`..` segments, and any
/// character outside `[A-Za-z0-9_./-]`.
pub fn validate_repo_path(path: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::Path(path.to_string());

    if !PATH_RE.is_match(path) || path.starts_with('/') {
        return Err(invalid());
    }

    for segment in path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(invalid());
        }
    }

    Ok(())
}

/// Normalizes an export folder setting.
///
/// Surrounding whitespace and slashes are stripped. An empty folder means
/// "repository root" and yields `None`.
pub fn normalize_folder(folder: &str) -> Result<Option<String>, ValidationError> {
    let trimmed = folder.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(None);
    }
    validate_repo_path(trimmed)?;
    Ok(Some(trimmed.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_name_accepts_alphanumeric_and_underscore() {
        assert_eq!(sanitize_resource_name("CustomersV3").unwrap(), "CustomersV3");
        assert_eq!(sanitize_resource_name("Sales_Order_1").unwrap(), "Sales_Order_1");
        assert_eq!(sanitize_resource_name("  Vendors  ").unwrap(), "Vendors");
    }

    #[test]
    fn test_resource_name_rejects_injection() {
        let bad = [
            "",
            "   ",
            "Customers/../x",
            "Customers?$top=1",
            "Customers;drop",
            "Cust omers",
            "Customers%2F",
            "Kunden-Ä",
            "a.b",
        ];
        for name in bad {
            assert!(
                matches!(sanitize_resource_name(name), Err(ValidationError::ResourceName(_))),
                "expected rejection for {name:?}"
            );
        }
    }

    #[test]
    fn test_repo_identifier() {
        assert!(validate_repo_identifier("octo-org").is_ok());
        assert!(validate_repo_identifier("data.exports_2024").is_ok());
        assert!(validate_repo_identifier("..").is_err());
        assert!(validate_repo_identifier(".").is_err());
        assert!(validate_repo_identifier("a/b").is_err());
        assert!(validate_repo_identifier("").is_err());
        assert!(validate_repo_identifier("repo name").is_err());
    }

    #[test]
    fn test_repo_path() {
        assert!(validate_repo_path("exports/Customers_2024.json").is_ok());
        assert!(validate_repo_path("Customers.csv").is_ok());
        assert!(validate_repo_path("/etc/passwd").is_err());
        assert!(validate_repo_path("exports/../secrets.json").is_err());
        assert!(validate_repo_path("..").is_err());
        assert!(validate_repo_path("exports//x.json").is_err());
        assert!(validate_repo_path("exports/./x.json").is_err());
        assert!(validate_repo_path("exports\\x.json").is_err());
        assert!(validate_repo_path("exports/x.json?ref=main").is_err());
    }

    #[test]
    fn test_branch() {
        assert!(validate_branch("main").is_ok());
        assert!(validate_branch("feature/exports-1.2").is_ok());
        assert!(validate_branch("../main").is_err());
        assert!(validate_branch("-f").is_err());
        assert!(validate_branch("main&x=1").is_err());
        assert!(validate_branch("").is_err());
    }

    #[test]
    fn test_normalize_folder() {
        assert_eq!(normalize_folder("exports").unwrap().as_deref(), Some("exports"));
        assert_eq!(normalize_folder("/exports/erp/").unwrap().as_deref(), Some("exports/erp"));
        assert_eq!(normalize_folder("  ").unwrap(), None);
        assert_eq!(normalize_folder("/").unwrap(), None);
        assert!(normalize_folder("exports/../..").is_err());
    }
}
