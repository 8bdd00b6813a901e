//! HMAC-SHA256 webhook authentication.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::NetworkRegistry;
use crate::domain::Network;
use crate::error::BioVerifyError;

/// Header carrying the hex HMAC of the raw body.
pub const SIGNATURE_HEADER: &str = "x-alchemy-signature";

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `body` under `secret`.
pub fn sign(secret: &str, body: &[u8]) -> Result<String, BioVerifyError> {
    let mut mac = new_mac(secret)?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Authenticate `body` against every configured secret.
///
/// Returns the network whose secret produced the signature. Fails closed
/// with [`BioVerifyError::Configuration`] when no secret is configured, and
/// with [`BioVerifyError::Authentication`] when the signature is missing,
/// malformed or matches no secret. Comparison is constant-time.
pub fn verify_signature(
    secrets: &NetworkRegistry<String>,
    body: &[u8],
    signature: Option<&str>,
) -> Result<Network, BioVerifyError> {
    if secrets.is_empty() {
        return Err(BioVerifyError::Configuration(
            "no webhook signing secret configured".into(),
        ));
    }

    let signature = signature
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BioVerifyError::Authentication(format!("missing {SIGNATURE_HEADER} header")))?;
    let expected = hex::decode(signature.strip_prefix("0x").unwrap_or(signature))
        .map_err(|_| BioVerifyError::Authentication("signature is not hex".into()))?;

    for (network, secret) in secrets.iter() {
        let mut mac = new_mac(secret)?;
        mac.update(body);
        if mac.verify_slice(&expected).is_ok() {
            return Ok(network);
        }
    }

    Err(BioVerifyError::Authentication(
        "signature does not match any configured secret".into(),
    ))
}

fn new_mac(secret: &str) -> Result<HmacSha256, BioVerifyError> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BioVerifyError::Configuration(format!("invalid webhook secret: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"event":{"data":{"block":{"logs":[]}}}}"#;

    fn secrets() -> NetworkRegistry<String> {
        NetworkRegistry::new()
            .with(Network::Sepolia, "sepolia-secret".to_string())
            .with(Network::SeiTestnet, "sei-secret".to_string())
    }

    #[test]
    fn test_known_hmac_vector() {
        // RFC 4231 test case 2
        let sig = sign("Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            sig,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_signature_selects_matching_network() {
        let sig = sign("sei-secret", BODY).unwrap();
        assert_eq!(
            verify_signature(&secrets(), BODY, Some(&sig)).unwrap(),
            Network::SeiTestnet
        );
    }

    #[test]
    fn test_signature_for_one_network_fails_against_the_other() {
        let sig = sign("sepolia-secret", BODY).unwrap();
        let only_sei = NetworkRegistry::new().with(Network::SeiTestnet, "sei-secret".to_string());
        assert!(matches!(
            verify_signature(&only_sei, BODY, Some(&sig)).unwrap_err(),
            BioVerifyError::Authentication(_)
        ));
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let sig = sign("sepolia-secret", BODY).unwrap();
        let err = verify_signature(&secrets(), b"{}", Some(&sig)).unwrap_err();
        assert!(matches!(err, BioVerifyError::Authentication(_)));
    }

    #[test]
    fn test_missing_or_garbled_signature_is_rejected() {
        for sig in [None, Some(""), Some("not-hex")] {
            assert!(matches!(
                verify_signature(&secrets(), BODY, sig).unwrap_err(),
                BioVerifyError::Authentication(_)
            ));
        }
    }

    #[test]
    fn test_zero_secrets_fail_closed_before_checking_signature() {
        let err = verify_signature(&NetworkRegistry::new(), BODY, None).unwrap_err();
        assert!(matches!(err, BioVerifyError::Configuration(_)));
    }
}
