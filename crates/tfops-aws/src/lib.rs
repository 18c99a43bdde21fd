//! AWS implementation of the remote-state [`StateBackend`]: S3 buckets for
//! state and a DynamoDB table for locks.
//!
//! The SDK is async; the bootstrap sequencing is not. `AwsBackend` owns a
//! current-thread Tokio runtime and blocks on one call at a time.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType, TableStatus,
};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::types::{
    BucketLocationConstraint, BucketVersioningStatus, CreateBucketConfiguration,
    PublicAccessBlockConfiguration, ServerSideEncryption, ServerSideEncryptionByDefault,
    ServerSideEncryptionConfiguration, ServerSideEncryptionRule, VersioningConfiguration,
};
use tfops_core::bootstrap::{BackendError, Created, StateBackend, TableState};
use tfops_core::{Result, TfopsError};
use tokio::runtime::Runtime;

/// Hash key Terraform's S3 backend uses for lock items.
pub const LOCK_KEY: &str = "LockID";

/// The only region where S3 rejects an explicit location constraint.
const DEFAULT_S3_REGION: &str = "us-east-1";

pub struct AwsBackend {
    runtime: Runtime,
    region: String,
    s3: aws_sdk_s3::Client,
    dynamodb: aws_sdk_dynamodb::Client,
}

impl AwsBackend {
    /// Load the default credential chain for `region` and build both clients.
    /// Fails when no credentials can be resolved.
    pub fn connect(region: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let sdk_config = runtime.block_on(load_config(region))?;
        let backend = Self {
            s3: aws_sdk_s3::Client::new(&sdk_config),
            dynamodb: aws_sdk_dynamodb::Client::new(&sdk_config),
            region: region.to_string(),
            runtime,
        };
        tracing::debug!(region, "aws clients initialized");
        Ok(backend)
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

async fn load_config(region: &str) -> Result<SdkConfig> {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await;
    let provider = config
        .credentials_provider()
        .ok_or_else(|| TfopsError::CredentialsNotFound("no credentials provider".into()))?;
    provider
        .provide_credentials()
        .await
        .map_err(|e| TfopsError::CredentialsNotFound(DisplayErrorContext(&e).to_string()))?;
    Ok(config)
}

fn backend_error<E>(err: E) -> BackendError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    BackendError::new(
        err.code().unwrap_or("Unknown"),
        DisplayErrorContext(&err).to_string(),
    )
}

fn build_error(err: impl std::fmt::Display) -> BackendError {
    BackendError::new("InvalidRequest", err.to_string())
}

// ---------------------------------------------------------------------------
// Error classification
// ---------------------------------------------------------------------------

/// A bucket we already own counts as created.
fn classify_create_bucket(err: CreateBucketError) -> std::result::Result<Created, BackendError> {
    if err.is_bucket_already_owned_by_you() {
        Ok(Created::AlreadyExists)
    } else {
        Err(backend_error(err))
    }
}

/// `ResourceInUseException` means the table exists (or is being created).
fn classify_create_table(err: CreateTableError) -> std::result::Result<Created, BackendError> {
    if err.is_resource_in_use_exception() {
        Ok(Created::AlreadyExists)
    } else {
        Err(backend_error(err))
    }
}

/// A table that is not visible yet is not ready, not an error.
fn classify_describe_table(
    err: DescribeTableError,
) -> std::result::Result<TableState, BackendError> {
    if err.is_resource_not_found_exception() {
        Ok(TableState::Missing)
    } else {
        Err(backend_error(err))
    }
}

fn table_state(status: Option<&TableStatus>) -> TableState {
    match status {
        Some(TableStatus::Active) => TableState::Active,
        Some(status) => TableState::Pending(status.as_str().to_string()),
        None => TableState::Pending("UNKNOWN".to_string()),
    }
}

impl StateBackend for AwsBackend {
    fn create_bucket(&self, bucket: &str) -> std::result::Result<Created, BackendError> {
        let mut request = self.s3.create_bucket().bucket(bucket);
        if self.region != DEFAULT_S3_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }
        match self.runtime.block_on(request.send()) {
            Ok(_) => Ok(Created::New),
            Err(err) => classify_create_bucket(err.into_service_error()),
        }
    }

    fn enable_versioning(&self, bucket: &str) -> std::result::Result<(), BackendError> {
        let request = self
            .s3
            .put_bucket_versioning()
            .bucket(bucket)
            .versioning_configuration(
                VersioningConfiguration::builder()
                    .status(BucketVersioningStatus::Enabled)
                    .build(),
            );
        self.runtime
            .block_on(request.send())
            .map(|_| ())
            .map_err(|e| backend_error(e.into_service_error()))
    }

    fn enable_default_encryption(&self, bucket: &str) -> std::result::Result<(), BackendError> {
        let default = ServerSideEncryptionByDefault::builder()
            .sse_algorithm(ServerSideEncryption::Aes256)
            .build()
            .map_err(build_error)?;
        let configuration = ServerSideEncryptionConfiguration::builder()
            .rules(
                ServerSideEncryptionRule::builder()
                    .apply_server_side_encryption_by_default(default)
                    .build(),
            )
            .build()
            .map_err(build_error)?;
        let request = self
            .s3
            .put_bucket_encryption()
            .bucket(bucket)
            .server_side_encryption_configuration(configuration);
        self.runtime
            .block_on(request.send())
            .map(|_| ())
            .map_err(|e| backend_error(e.into_service_error()))
    }

    fn block_public_access(&self, bucket: &str) -> std::result::Result<(), BackendError> {
        let request = self
            .s3
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(
                PublicAccessBlockConfiguration::builder()
                    .block_public_acls(true)
                    .ignore_public_acls(true)
                    .block_public_policy(true)
                    .restrict_public_buckets(true)
                    .build(),
            );
        self.runtime
            .block_on(request.send())
            .map(|_| ())
            .map_err(|e| backend_error(e.into_service_error()))
    }

    fn create_lock_table(&self, table: &str) -> std::result::Result<Created, BackendError> {
        let key = KeySchemaElement::builder()
            .attribute_name(LOCK_KEY)
            .key_type(KeyType::Hash)
            .build()
            .map_err(build_error)?;
        let attribute = AttributeDefinition::builder()
            .attribute_name(LOCK_KEY)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(build_error)?;
        let request = self
            .dynamodb
            .create_table()
            .table_name(table)
            .key_schema(key)
            .attribute_definitions(attribute)
            .billing_mode(BillingMode::PayPerRequest);
        match self.runtime.block_on(request.send()) {
            Ok(_) => Ok(Created::New),
            Err(err) => classify_create_table(err.into_service_error()),
        }
    }

    fn table_state(&self, table: &str) -> std::result::Result<TableState, BackendError> {
        let request = self.dynamodb.describe_table().table_name(table);
        match self.runtime.block_on(request.send()) {
            Ok(output) => Ok(table_state(output.table().and_then(|t| t.table_status()))),
            Err(err) => classify_describe_table(err.into_service_error()),
        }
    }
}
