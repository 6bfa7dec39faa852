//! Static check that repository queries stay scoped to a tenant.
//!
//! Every repository source file must filter by `org_id`, and every function
//! that reads, updates or deletes rows must mention `org_id` unless it is a
//! known cross-tenant operation listed below.

use std::fs;
use std::path::{Path, PathBuf};

/// Files without tenant-owned tables.
const EXEMPT_FILES: &[&str] = &["errors.rs", "mock.rs", "mod.rs", "stripe_event.rs"];

/// Functions that run outside a tenant context, keyed by file.
const CROSS_TENANT: &[(&str, &str)] = &[
    // Stripe resolves the tenant from the customer id.
    ("organization.rs", "get_organization_by_customer"),
    // Keyed by the organization's own id.
    ("organization.rs", "ensure_organization"),
    // Retry worker and delivery bookkeeping, keyed by primary key.
    ("webhook.rs", "list_failed_deliveries"),
    ("webhook.rs", "finish_delivery"),
    ("webhook.rs", "record_webhook_success"),
    ("webhook.rs", "record_webhook_failure"),
];

struct FnBody {
    name: String,
    body: String,
}

fn repository_files() -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/repository");
    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .expect("repository directory")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .filter(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            !EXEMPT_FILES.contains(&name)
        })
        .collect();
    files.sort();
    files
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

fn fn_name(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let rest = trimmed
        .strip_prefix("pub(crate) fn ")
        .or_else(|| trimmed.strip_prefix("pub fn "))
        .or_else(|| trimmed.strip_prefix("fn "))?;
    let end = rest.find(|c: char| c == '(' || c == '<')?;
    Some(rest[..end].to_string())
}

/// Splits production code into functions; test modules are ignored.
fn functions(source: &str) -> Vec<FnBody> {
    let mut items: Vec<FnBody> = Vec::new();
    for line in source.lines() {
        if line.trim_start().starts_with("#[cfg(test)]") {
            break;
        }
        if let Some(name) = fn_name(line) {
            items.push(FnBody {
                name,
                body: String::new(),
            });
        }
        if let Some(current) = items.last_mut() {
            current.body.push_str(line);
            current.body.push('\n');
        }
    }
    items
}

fn touches_existing_rows(body: &str) -> bool {
    body.contains("::table")
        && (body.contains(".filter(")
            || body.contains(".find(")
            || body.contains("diesel::update")
            || body.contains("diesel::delete"))
}

#[test]
fn every_repository_file_filters_by_org() {
    let files = repository_files();
    assert!(!files.is_empty());

    for path in files {
        let source = fs::read_to_string(&path).expect("readable source");
        assert!(
            source.contains("org_id.eq(") || source.contains("org_id.get()"),
            "{} has no org_id predicate",
            path.display()
        );
    }
}

#[test]
fn row_access_is_scoped_to_the_caller_org() {
    let mut offenders = Vec::new();

    for path in repository_files() {
        let file = file_name(&path).to_string();
        let source = fs::read_to_string(&path).expect("readable source");

        for item in functions(&source) {
            if !touches_existing_rows(&item.body) || item.body.contains("org_id") {
                continue;
            }
            let allowed = CROSS_TENANT
                .iter()
                .any(|(f, name)| *f == file && *name == item.name);
            if !allowed {
                offenders.push(format!("{file}::{}", item.name));
            }
        }
    }

    assert!(
        offenders.is_empty(),
        "unscoped repository functions: {offenders:?}"
    );
}

#[test]
fn cross_tenant_allowlist_has_no_stale_entries() {
    let files = repository_files();

    for (file, name) in CROSS_TENANT {
        let path = files
            .iter()
            .find(|path| file_name(path) == *file)
            .unwrap_or_else(|| panic!("{file} is missing"));
        let source = fs::read_to_string(path).expect("readable source");
        assert!(
            functions(&source).iter().any(|item| item.name == *name),
            "{file}::{name} no longer exists"
        );
    }
}
