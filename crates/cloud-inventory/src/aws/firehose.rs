//! Firehose delivery stream listing

use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use super::pagination::Page;
use aws_sdk_firehose::Client;
use aws_sdk_firehose::types::{
    DestinationDescription, ProcessingConfiguration, S3DestinationDescription,
};
use std::future::Future;

/// Where a delivery stream sends its records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationInfo {
    pub id: String,
    /// Destination service, e.g. `ExtendedS3` or `OpenSearch`
    pub kind: String,
    /// Search index, for Elasticsearch and OpenSearch destinations
    pub index_name: Option<String>,
    pub processing_enabled: Option<bool>,
    /// Type of the first record processor
    pub processor_type: Option<String>,
    /// Parameters of the first record processor, as a JSON array
    pub processor_parameters: Option<String>,
    pub s3_backup_mode: Option<String>,
    /// Target bucket, or the backup bucket for non-S3 destinations
    pub bucket_arn: Option<String>,
    pub compression_format: Option<String>,
    pub retry_duration_secs: Option<i32>,
}

/// The parts of a delivery stream description that go into the report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryStreamInfo {
    pub name: String,
    pub stream_type: Option<String>,
    pub status: Option<String>,
    pub encryption_key_type: Option<String>,
    pub encryption_status: Option<String>,
    pub destinations: Vec<DestinationInfo>,
}

/// Delivery stream operations
pub trait DeliveryStreamApi: Send + Sync {
    /// One page of delivery stream names, starting after `exclusive_start`
    fn list_delivery_streams(
        &self,
        exclusive_start: Option<String>,
    ) -> impl Future<Output = Result<Page<String>, AwsError>> + Send;

    fn describe_delivery_stream(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<DeliveryStreamInfo, AwsError>> + Send;
}

/// Firehose client
pub struct FirehoseClient {
    client: Client,
}

impl FromAwsContext for FirehoseClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.firehose_client(),
        }
    }
}

fn set_processing(info: &mut DestinationInfo, config: Option<&ProcessingConfiguration>) {
    let Some(config) = config else {
        return;
    };
    info.processing_enabled = config.enabled();
    if let Some(processor) = config.processors().first() {
        info.processor_type = Some(processor.r#type().as_str().to_string());
        let parameters: Vec<_> = processor
            .parameters()
            .iter()
            .map(|p| {
                serde_json::json!({
                    "ParameterName": p.parameter_name().as_str(),
                    "ParameterValue": p.parameter_value(),
                })
            })
            .collect();
        info.processor_parameters = Some(serde_json::Value::from(parameters).to_string());
    }
}

fn set_bucket(info: &mut DestinationInfo, s3: Option<&S3DestinationDescription>) {
    if let Some(s3) = s3 {
        info.bucket_arn = Some(s3.bucket_arn().to_string());
        info.compression_format = Some(s3.compression_format().as_str().to_string());
    }
}

fn destination_info(dest: &DestinationDescription) -> DestinationInfo {
    let mut info = DestinationInfo {
        id: dest.destination_id().to_string(),
        ..DestinationInfo::default()
    };

    // Extended S3 destinations also carry a plain S3 description, so check it first
    if let Some(d) = dest.extended_s3_destination_description() {
        info.kind = "ExtendedS3".to_string();
        info.bucket_arn = Some(d.bucket_arn().to_string());
        info.compression_format = Some(d.compression_format().as_str().to_string());
        info.s3_backup_mode = d.s3_backup_mode().map(|m| m.as_str().to_string());
        set_processing(&mut info, d.processing_configuration());
    } else if let Some(d) = dest.elasticsearch_destination_description() {
        info.kind = "Elasticsearch".to_string();
        info.index_name = d.index_name().map(str::to_string);
        info.s3_backup_mode = d.s3_backup_mode().map(|m| m.as_str().to_string());
        info.retry_duration_secs = d.retry_options().and_then(|r| r.duration_in_seconds());
        set_bucket(&mut info, d.s3_destination_description());
        set_processing(&mut info, d.processing_configuration());
    } else if let Some(d) = dest.amazonopensearchservice_destination_description() {
        info.kind = "OpenSearch".to_string();
        info.index_name = d.index_name().map(str::to_string);
        info.s3_backup_mode = d.s3_backup_mode().map(|m| m.as_str().to_string());
        info.retry_duration_secs = d.retry_options().and_then(|r| r.duration_in_seconds());
        set_bucket(&mut info, d.s3_destination_description());
        set_processing(&mut info, d.processing_configuration());
    } else if let Some(d) = dest.redshift_destination_description() {
        info.kind = "Redshift".to_string();
        info.s3_backup_mode = d.s3_backup_mode().map(|m| m.as_str().to_string());
        info.retry_duration_secs = d.retry_options().and_then(|r| r.duration_in_seconds());
        set_bucket(&mut info, d.s3_destination_description());
        set_processing(&mut info, d.processing_configuration());
    } else if let Some(d) = dest.splunk_destination_description() {
        info.kind = "Splunk".to_string();
        info.s3_backup_mode = d.s3_backup_mode().map(|m| m.as_str().to_string());
        info.retry_duration_secs = d.retry_options().and_then(|r| r.duration_in_seconds());
        set_bucket(&mut info, d.s3_destination_description());
        set_processing(&mut info, d.processing_configuration());
    } else if let Some(d) = dest.http_endpoint_destination_description() {
        info.kind = "HttpEndpoint".to_string();
        info.s3_backup_mode = d.s3_backup_mode().map(|m| m.as_str().to_string());
        info.retry_duration_secs = d.retry_options().and_then(|r| r.duration_in_seconds());
        set_bucket(&mut info, d.s3_destination_description());
        set_processing(&mut info, d.processing_configuration());
    } else if let Some(d) = dest.s3_destination_description() {
        info.kind = "S3".to_string();
        set_bucket(&mut info, Some(d));
    } else {
        info.kind = "Other".to_string();
    }
    info
}

impl DeliveryStreamApi for FirehoseClient {
    async fn list_delivery_streams(
        &self,
        exclusive_start: Option<String>,
    ) -> Result<Page<String>, AwsError> {
        let response = self
            .client
            .list_delivery_streams()
            .set_exclusive_start_delivery_stream_name(exclusive_start)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        // Paged by name: the next page starts after the last name seen
        let names = response.delivery_stream_names().to_vec();
        let next = if response.has_more_delivery_streams() {
            names.last().cloned()
        } else {
            None
        };
        Ok(Page::new(names, next.as_deref()))
    }

    async fn describe_delivery_stream(&self, name: &str) -> Result<DeliveryStreamInfo, AwsError> {
        let response = self
            .client
            .describe_delivery_stream()
            .delivery_stream_name(name)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(&e))?;

        let Some(stream) = response.delivery_stream_description() else {
            return Ok(DeliveryStreamInfo {
                name: name.to_string(),
                ..DeliveryStreamInfo::default()
            });
        };

        let encryption = stream.delivery_stream_encryption_configuration();
        Ok(DeliveryStreamInfo {
            name: stream.delivery_stream_name().to_string(),
            stream_type: Some(stream.delivery_stream_type().as_str().to_string()),
            status: Some(stream.delivery_stream_status().as_str().to_string()),
            encryption_key_type: encryption
                .and_then(|e| e.key_type())
                .map(|k| k.as_str().to_string()),
            encryption_status: encryption
                .and_then(|e| e.status())
                .map(|s| s.as_str().to_string()),
            destinations: stream.destinations().iter().map(destination_info).collect(),
        })
    }
}
