//! Request and response models of the Secrets Manager REST API
//!
//! Secrets are polymorphic on the wire: the `type` member selects the
//! variant. Decoding goes through [`Secret::from_value`], which is the only
//! place an unknown discriminator can surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors decoding service payloads into models
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Unrecognized secret subtype encountered: '{0}'")]
    UnrecognizedSubtype(String),

    #[error("Discriminator property 'type' not found in secret")]
    MissingDiscriminator,

    #[error("Failed to decode secret: {0}")]
    Json(#[from] serde_json::Error),
}

/// Secret type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretType {
    Arbitrary,
    UsernamePassword,
    IamCredentials,
    ServiceCredentials,
    Kv,
    ImportedCert,
    PublicCert,
    PrivateCert,
}

impl SecretType {
    pub const ALL: [SecretType; 8] = [
        SecretType::Arbitrary,
        SecretType::UsernamePassword,
        SecretType::IamCredentials,
        SecretType::ServiceCredentials,
        SecretType::Kv,
        SecretType::ImportedCert,
        SecretType::PublicCert,
        SecretType::PrivateCert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SecretType::Arbitrary => "arbitrary",
            SecretType::UsernamePassword => "username_password",
            SecretType::IamCredentials => "iam_credentials",
            SecretType::ServiceCredentials => "service_credentials",
            SecretType::Kv => "kv",
            SecretType::ImportedCert => "imported_cert",
            SecretType::PublicCert => "public_cert",
            SecretType::PrivateCert => "private_cert",
        }
    }

    pub fn parse(s: &str) -> Option<SecretType> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for SecretType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Secret groups
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretGroup {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub last_update_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretGroupCollection {
    pub secret_groups: Vec<SecretGroup>,
    pub total_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecretGroupPrototype {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SecretGroupPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SecretGroupPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

// =============================================================================
// Secrets
// =============================================================================

/// Members shared by every secret variant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretCommon {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub secret_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub secret_group_id: Option<String>,
    pub labels: Option<Vec<String>>,
    pub created_by: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub last_update_date: Option<DateTime<Utc>>,
    pub version_id: Option<String>,
    pub versions_total: Option<i64>,
    pub expiration_date: Option<DateTime<Utc>>,
}

/// Certificate metadata shared by the certificate variants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateInfo {
    pub serial_number: Option<String>,
    pub algorithm: Option<String>,
    pub key_algorithm: Option<String>,
    pub issuer: Option<String>,
    pub validity: Option<CertificateValidity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateValidity {
    pub not_before: Option<DateTime<Utc>>,
    pub not_after: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationPolicy {
    pub auto_rotate: Option<bool>,
    pub rotate_keys: Option<bool>,
}

/// Any recognized secret type without a dedicated variant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericSecret {
    #[serde(flatten)]
    pub common: SecretCommon,
    #[serde(flatten)]
    pub certificate_info: CertificateInfo,
    pub intermediate_included: Option<bool>,
    pub private_key_included: Option<bool>,
    pub certificate: Option<String>,
    pub intermediate: Option<String>,
    pub private_key: Option<String>,
    pub bundle_certs: Option<bool>,
    pub rotation: Option<RotationPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportedCertificate {
    #[serde(flatten)]
    pub common: SecretCommon,
    #[serde(flatten)]
    pub certificate_info: CertificateInfo,
    pub intermediate_included: Option<bool>,
    pub private_key_included: Option<bool>,
    pub certificate: Option<String>,
    pub intermediate: Option<String>,
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicCertificate {
    #[serde(flatten)]
    pub common: SecretCommon,
    #[serde(flatten)]
    pub certificate_info: CertificateInfo,
    pub bundle_certs: Option<bool>,
    pub rotation: Option<RotationPolicy>,
}

/// A secret, by variant
#[derive(Debug, Clone, PartialEq)]
pub enum Secret {
    Generic(GenericSecret),
    ImportedCertificate(ImportedCertificate),
    PublicCertificate(PublicCertificate),
}

impl Secret {
    /// Decode a secret, selecting the variant from its `type` member
    pub fn from_value(value: serde_json::Value) -> Result<Secret, ModelError> {
        let discriminator = value
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(ModelError::MissingDiscriminator)?;
        let secret_type = SecretType::parse(discriminator)
            .ok_or_else(|| ModelError::UnrecognizedSubtype(discriminator.to_string()))?;

        let secret = match secret_type {
            SecretType::ImportedCert => Secret::ImportedCertificate(serde_json::from_value(value)?),
            SecretType::PublicCert => Secret::PublicCertificate(serde_json::from_value(value)?),
            _ => Secret::Generic(serde_json::from_value(value)?),
        };
        Ok(secret)
    }

    pub fn common(&self) -> &SecretCommon {
        match self {
            Secret::Generic(s) => &s.common,
            Secret::ImportedCertificate(s) => &s.common,
            Secret::PublicCertificate(s) => &s.common,
        }
    }

    pub fn certificate_info(&self) -> &CertificateInfo {
        match self {
            Secret::Generic(s) => &s.certificate_info,
            Secret::ImportedCertificate(s) => &s.certificate_info,
            Secret::PublicCertificate(s) => &s.certificate_info,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.common().id.as_deref()
    }

    pub fn secret_type(&self) -> Option<SecretType> {
        self.common().secret_type.as_deref().and_then(SecretType::parse)
    }
}

/// Link to another page of a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLink {
    pub href: String,
}

/// One page of secret metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretMetadataPage {
    pub secrets: Vec<Secret>,
    pub total_count: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub first: Option<PageLink>,
    pub previous: Option<PageLink>,
    pub next: Option<PageLink>,
    pub last: Option<PageLink>,
}

/// Wire form of [`SecretMetadataPage`] before variant dispatch
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawSecretMetadataPage {
    pub secrets: Vec<serde_json::Value>,
    pub total_count: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub first: Option<PageLink>,
    pub previous: Option<PageLink>,
    pub next: Option<PageLink>,
    pub last: Option<PageLink>,
}

impl TryFrom<RawSecretMetadataPage> for SecretMetadataPage {
    type Error = ModelError;

    fn try_from(raw: RawSecretMetadataPage) -> Result<Self, Self::Error> {
        let secrets = raw
            .secrets
            .into_iter()
            .map(Secret::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SecretMetadataPage {
            secrets,
            total_count: raw.total_count,
            limit: raw.limit,
            offset: raw.offset,
            first: raw.first,
            previous: raw.previous,
            next: raw.next,
            last: raw.last,
        })
    }
}

// =============================================================================
// Prototypes
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportedCertificatePrototype {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub certificate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intermediate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PublicCertificatePrototype {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    pub bundle_certs: bool,
}

/// Request body for creating a secret; serialized with its `type` tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SecretPrototype {
    #[serde(rename = "imported_cert")]
    ImportedCertificate(ImportedCertificatePrototype),
    #[serde(rename = "public_cert")]
    PublicCertificate(PublicCertificatePrototype),
}

impl SecretPrototype {
    pub fn secret_type(&self) -> SecretType {
        match self {
            SecretPrototype::ImportedCertificate(_) => SecretType::ImportedCert,
            SecretPrototype::PublicCertificate(_) => SecretType::PublicCert,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SecretPrototype::ImportedCertificate(p) => &p.name,
            SecretPrototype::PublicCertificate(p) => &p.name,
        }
    }
}
