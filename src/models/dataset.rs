//! Dataset detail records as served by the Data API
//!
//! The Data API speaks camelCase JSON; these types deserialize it directly.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetMetadata {
    #[serde(rename = "datasetMetadataID", deserialize_with = "null_as_default")]
    pub dataset_metadata_id: i64,
    #[serde(rename = "datasetID", deserialize_with = "null_as_default")]
    pub dataset_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub file_identifier: String,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub publication_date: String,
    #[serde(rename = "metaDataDate", deserialize_with = "null_as_default")]
    pub metadata_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GeospatialData {
    #[serde(rename = "datasetGeospatialDataID", deserialize_with = "null_as_default")]
    pub dataset_geospatial_data_id: i64,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub temporal_extent_start: Option<String>,
    pub temporal_extent_end: Option<String>,
    pub bounding_box: Option<String>,
    pub contact: Option<String>,
    pub metadata_standard: Option<String>,
    pub standard_version: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DataFile {
    #[serde(rename = "dataFileID", deserialize_with = "null_as_default")]
    pub data_file_id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub file_type: Option<String>,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SupportingDocument {
    #[serde(rename = "supportingDocumentID", deserialize_with = "null_as_default")]
    pub supporting_document_id: i64,
    pub title: Option<String>,
    pub download_url: Option<String>,
    pub document_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetRelationship {
    #[serde(rename = "datasetRelationshipID", deserialize_with = "null_as_default")]
    pub dataset_relationship_id: i64,
    #[serde(rename = "datasetID", deserialize_with = "null_as_default")]
    pub dataset_id: String,
    pub relationship_type: Option<String>,
    pub relationship_uri: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMetadataDocument {
    #[serde(rename = "metadataDocumentID", deserialize_with = "null_as_default")]
    pub metadata_document_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub document_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub raw_document: String,
}

/// Fully hydrated dataset record, keyed by `file_identifier`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetDetail {
    #[serde(deserialize_with = "null_as_default")]
    pub dataset_metadata: DatasetMetadata,
    pub geospatial_data: Option<GeospatialData>,
    #[serde(deserialize_with = "null_as_default")]
    pub data_files: Vec<DataFile>,
    #[serde(deserialize_with = "null_as_default")]
    pub supporting_documents: Vec<SupportingDocument>,
    #[serde(deserialize_with = "null_as_default")]
    pub relationships: Vec<DatasetRelationship>,
    #[serde(deserialize_with = "null_as_default")]
    pub raw_documents: Vec<RawMetadataDocument>,
}

impl DatasetDetail {
    pub fn file_identifier(&self) -> &str {
        &self.dataset_metadata.file_identifier
    }

    pub fn title(&self) -> &str {
        self.dataset_metadata.title.as_deref().unwrap_or("Untitled dataset")
    }
}

/// Aggregate catalog counts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoveryStats {
    #[serde(deserialize_with = "null_as_default")]
    pub total_datasets: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_providers: u64,
}

/// Outcome of an ETL trigger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessResult {
    pub is_success: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    pub file_path: Option<String>,
    pub error: Option<String>,
}

impl Default for ProcessResult {
    fn default() -> Self {
        Self {
            is_success: true,
            message: String::new(),
            file_path: None,
            error: None,
        }
    }
}
