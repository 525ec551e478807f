use crate::error::FixtureError;
use crate::Result;
use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
    KeyUsagePurpose, PKCS_ECDSA_P256_SHA256,
};
use std::fs;
use std::path::{Path, PathBuf};
use time::{Duration, OffsetDateTime};
use tracing::info;

const CA_COMMON_NAME: &str = "Fixture Proxy CA";
const CA_ORGANIZATION: &str = "Fixture Proxy";

/// Root CA used by hudsucker to sign per-host certificates.
///
/// Persisted as `ca.pem`/`ca.key` so test clients can trust one stable root
/// across runs; `ca.crt` is a copy for tools that expect that extension.
pub struct CertificateAuthority {
    ca_cert: Certificate,
}

impl CertificateAuthority {
    /// Load the CA from `ca_dir`, or generate and store a new one.
    pub fn new(ca_dir: &Path) -> Result<Self> {
        let (cert_path, key_path) = Self::paths(ca_dir);

        if cert_path.exists() && key_path.exists() {
            info!("Loading CA from {}", ca_dir.display());
            let cert_pem = fs::read_to_string(&cert_path)?;
            let key_pem = fs::read_to_string(&key_path)?;
            Self::from_pem(&cert_pem, &key_pem)
        } else {
            fs::create_dir_all(ca_dir)?;
            info!("Generating new CA in {}", ca_dir.display());
            Self::generate_and_save(&cert_path, &key_path)
        }
    }

    /// Paths of the certificate and key inside `ca_dir`
    pub fn paths(ca_dir: &Path) -> (PathBuf, PathBuf) {
        (ca_dir.join("ca.pem"), ca_dir.join("ca.key"))
    }

    /// Rebuild the CA from its stored certificate and key.
    ///
    /// rcgen cannot sign with a parsed certificate, so the CA certificate is
    /// re-issued from the stored one's parameters (subject, serial, validity)
    /// and the same key.
    pub fn from_pem(cert_pem: &str, key_pem: &str) -> Result<Self> {
        let key_pair = KeyPair::from_pem(key_pem)
            .map_err(|e| FixtureError::Certificate(format!("Failed to parse CA key: {}", e)))?;

        let mut params = CertificateParams::from_ca_cert_pem(cert_pem, key_pair)
            .map_err(|e| FixtureError::Certificate(format!("Failed to parse CA cert: {}", e)))?;
        params.is_ca = IsCa::Ca(BasicConstraints::Constrained(0));
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];

        let cert = Certificate::from_params(params)
            .map_err(|e| FixtureError::Certificate(format!("Failed to rebuild CA cert: {}", e)))?;

        Ok(Self { ca_cert: cert })
    }

    fn ca_params() -> CertificateParams {
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, CA_COMMON_NAME);
        dn.push(DnType::OrganizationName, CA_ORGANIZATION);
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(BasicConstraints::Constrained(0));
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
        params.alg = &PKCS_ECDSA_P256_SHA256;
        params
    }

    fn generate_and_save(cert_path: &Path, key_path: &Path) -> Result<Self> {
        let mut params = Self::ca_params();

        let not_before = OffsetDateTime::now_utc();
        params.not_before = not_before;
        params.not_after = not_before + Duration::days(365 * 10);

        let key_pair = KeyPair::generate(&PKCS_ECDSA_P256_SHA256)
            .map_err(|e| FixtureError::Certificate(format!("Failed to generate CA key: {}", e)))?;
        params.key_pair = Some(key_pair);

        let cert = Certificate::from_params(params)
            .map_err(|e| FixtureError::Certificate(format!("Failed to generate CA cert: {}", e)))?;

        let ca = Self { ca_cert: cert };
        let cert_pem = ca.get_ca_cert_pem()?;

        fs::write(cert_path, &cert_pem)?;
        fs::write(key_path, ca.get_ca_key_pem())?;
        fs::write(cert_path.with_extension("crt"), &cert_pem)?;

        Ok(ca)
    }

    /// Root CA certificate in PEM format
    pub fn get_ca_cert_pem(&self) -> Result<String> {
        self.ca_cert
            .serialize_pem()
            .map_err(|e| FixtureError::Certificate(format!("Failed to serialize CA cert: {}", e)))
    }

    /// Root CA private key in PEM format
    pub fn get_ca_key_pem(&self) -> String {
        self.ca_cert.serialize_private_key_pem()
    }

    /// DER certificate for hudsucker/rustls
    pub fn get_ca_cert_der(&self) -> Result<Vec<u8>> {
        self.ca_cert
            .serialize_der()
            .map_err(|e| FixtureError::Certificate(format!("Failed to serialize CA cert DER: {}", e)))
    }

    /// DER private key for hudsucker/rustls
    pub fn get_ca_key_der(&self) -> Vec<u8> {
        self.ca_cert.serialize_private_key_der()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ca_generation_and_loading() {
        let dir = tempdir().unwrap();
        let ca_dir = dir.path().join("certs");

        let ca = CertificateAuthority::new(&ca_dir).expect("Failed to create CA");
        assert!(ca_dir.join("ca.pem").exists());
        assert!(ca_dir.join("ca.key").exists());
        assert!(ca_dir.join("ca.crt").exists());

        let key_before = fs::read_to_string(ca_dir.join("ca.key")).unwrap();

        // Second creation loads the stored key instead of generating
        let loaded = CertificateAuthority::new(&ca_dir).expect("Failed to load CA");
        assert_eq!(loaded.get_ca_key_der(), ca.get_ca_key_der());
        assert_eq!(fs::read_to_string(ca_dir.join("ca.key")).unwrap(), key_before);
    }

    #[test]
    fn test_reloaded_ca_keeps_stored_validity() {
        let dir = tempdir().unwrap();
        let ca = CertificateAuthority::new(dir.path()).unwrap();
        let loaded = CertificateAuthority::new(dir.path()).unwrap();

        let original = ca.ca_cert.get_params();
        let reloaded = loaded.ca_cert.get_params();

        // X.509 keeps whole seconds only
        assert_eq!(
            reloaded.not_before.unix_timestamp(),
            original.not_before.unix_timestamp()
        );
        assert_eq!(
            reloaded.not_after.unix_timestamp(),
            original.not_after.unix_timestamp()
        );
    }

    #[test]
    fn test_invalid_cert_pem() {
        let dir = tempdir().unwrap();
        let ca = CertificateAuthority::new(dir.path()).unwrap();

        let err = CertificateAuthority::from_pem("not a cert", &ca.get_ca_key_pem())
            .err()
            .unwrap();
        assert!(matches!(err, FixtureError::Certificate(_)));
    }

    #[test]
    fn test_pem_and_der_accessors() {
        let dir = tempdir().unwrap();
        let ca = CertificateAuthority::new(dir.path()).unwrap();

        assert!(ca.get_ca_cert_pem().unwrap().contains("BEGIN CERTIFICATE"));
        assert!(ca.get_ca_key_pem().contains("BEGIN PRIVATE KEY"));
        assert!(!ca.get_ca_cert_der().unwrap().is_empty());
        assert!(!ca.get_ca_key_der().is_empty());
    }

    #[test]
    fn test_invalid_key_pem() {
        let err = CertificateAuthority::from_pem("", "not a key").err().unwrap();
        assert!(matches!(err, FixtureError::Certificate(_)));
    }
}
