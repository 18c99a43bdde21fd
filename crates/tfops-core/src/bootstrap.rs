//! Remote-state backend bootstrap: one bucket per environment plus the lock
//! table, each created if absent.
//!
//! Provider calls go through [`StateBackend`]; this module owns the
//! sequencing, the idempotency rules and the readiness poll.

use crate::config::BackendConfig;
use crate::report::Reporter;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A provider-side failure, classified by the provider's error code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct BackendError {
    pub code: String,
    pub message: String,
}

impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Created {
    New,
    AlreadyExists,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableState {
    Missing,
    Active,
    Pending(String),
}

/// Cloud calls needed to provision the backend. Implementations map the
/// provider's "already exists" answers to `Created::AlreadyExists`.
pub trait StateBackend {
    fn create_bucket(&self, bucket: &str) -> Result<Created, BackendError>;
    fn enable_versioning(&self, bucket: &str) -> Result<(), BackendError>;
    fn enable_default_encryption(&self, bucket: &str) -> Result<(), BackendError>;
    fn block_public_access(&self, bucket: &str) -> Result<(), BackendError>;
    fn create_lock_table(&self, table: &str) -> Result<Created, BackendError>;
    fn table_state(&self, table: &str) -> Result<TableState, BackendError>;
}

// ---------------------------------------------------------------------------
// Resources and report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Bucket,
    LockTable,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Bucket => "S3 bucket",
            ResourceKind::LockTable => "DynamoDB table",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub name: String,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Created or already present; the two are not distinguished.
    pub ensured: Vec<Resource>,
    pub failed: Vec<(Resource, BackendError)>,
}

impl BootstrapReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapPlan {
    pub buckets: Vec<String>,
    pub lock_table: String,
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl BootstrapPlan {
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            buckets: config.bucket_names(),
            lock_table: config.lock_table.clone(),
            poll_interval: config.poll_interval(),
            max_polls: config.lock_table_max_polls,
        }
    }
}

// ---------------------------------------------------------------------------
// Bootstrapper
// ---------------------------------------------------------------------------

pub struct Bootstrapper<'a> {
    backend: &'a dyn StateBackend,
    reporter: &'a Reporter,
}

impl<'a> Bootstrapper<'a> {
    pub fn new(backend: &'a dyn StateBackend, reporter: &'a Reporter) -> Self {
        Self { backend, reporter }
    }

    /// Ensure every resource in `plan`. A failure on one resource is recorded
    /// and the rest are still attempted.
    pub fn run(&self, plan: &BootstrapPlan) -> BootstrapReport {
        let mut report = BootstrapReport::default();

        for bucket in &plan.buckets {
            let resource = Resource {
                kind: ResourceKind::Bucket,
                name: bucket.clone(),
            };
            match self.ensure_bucket(bucket) {
                Ok(_) => report.ensured.push(resource),
                Err(e) => report.failed.push((resource, e)),
            }
        }

        let table = Resource {
            kind: ResourceKind::LockTable,
            name: plan.lock_table.clone(),
        };
        match self.ensure_lock_table(&plan.lock_table, plan.poll_interval, plan.max_polls) {
            Ok(_) => report.ensured.push(table),
            Err(e) => report.failed.push((table, e)),
        }

        report
    }

    /// Create and harden a bucket. The hardening calls are idempotent and run
    /// for existing buckets too, so an earlier partial setup is completed.
    pub fn ensure_bucket(&self, bucket: &str) -> Result<Created, BackendError> {
        let result = self.backend.create_bucket(bucket).and_then(|created| {
            self.backend.enable_versioning(bucket)?;
            self.backend.enable_default_encryption(bucket)?;
            self.backend.block_public_access(bucket)?;
            Ok(created)
        });
        match &result {
            Ok(Created::New) => self
                .reporter
                .success(&format!("S3 bucket '{bucket}' created successfully")),
            Ok(Created::AlreadyExists) => self
                .reporter
                .warn(&format!("S3 bucket '{bucket}' already exists")),
            Err(e) => {
                tracing::warn!(bucket, code = %e.code, "bucket provisioning failed");
                self.reporter
                    .error(&format!("Error creating S3 bucket '{bucket}': {e}"))
            }
        }
        result
    }

    /// Create the lock table and wait for it to become active. An existing
    /// table is accepted without waiting.
    pub fn ensure_lock_table(
        &self,
        table: &str,
        poll_interval: Duration,
        max_polls: u32,
    ) -> Result<Created, BackendError> {
        let result = self.backend.create_lock_table(table).and_then(|created| {
            if created == Created::New {
                self.wait_until_active(table, poll_interval, max_polls)?;
            }
            Ok(created)
        });
        match &result {
            Ok(Created::New) => self
                .reporter
                .success(&format!("DynamoDB table '{table}' created successfully")),
            Ok(Created::AlreadyExists) => self
                .reporter
                .warn(&format!("DynamoDB table '{table}' already exists")),
            Err(e) => {
                tracing::warn!(table, code = %e.code, "lock table provisioning failed");
                self.reporter
                    .error(&format!("Error creating DynamoDB table '{table}': {e}"))
            }
        }
        result
    }

    fn wait_until_active(
        &self,
        table: &str,
        poll_interval: Duration,
        max_polls: u32,
    ) -> Result<(), BackendError> {
        for attempt in 1..=max_polls {
            let state = self.backend.table_state(table)?;
            tracing::debug!(table, attempt, ?state, "polled lock table");
            if state == TableState::Active {
                return Ok(());
            }
            if attempt < max_polls {
                std::thread::sleep(poll_interval);
            }
        }
        Err(BackendError::new(
            "WaiterTimeout",
            format!("table '{table}' did not become ACTIVE after {max_polls} checks"),
        ))
    }

    pub fn print_summary(&self, report: &BootstrapReport) {
        self.reporter.line("\n📋 Setup Summary:");
        for resource in &report.ensured {
            self.reporter.line(&format!("  ✅ {resource}"));
        }
        for (resource, e) in &report.failed {
            self.reporter.line(&format!("  ❌ {resource} ({})", e.code));
        }

        if report.is_success() {
            self.reporter.line("\n🎉 AWS backend setup completed!");
        } else {
            self.reporter.line(&format!(
                "\n{} resource(s) could not be provisioned.",
                report.failed.len()
            ));
        }
        self.reporter.line("\nNext steps:");
        self.reporter
            .line("1. Update your public key in terraform.tfvars files");
        self.reporter
            .line("2. Review and adjust CIDR blocks and instance types");
        self.reporter
            .line("3. Run: deploy --environment dev --action plan");
    }
}
