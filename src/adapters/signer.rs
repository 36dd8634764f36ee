use crate::config::profile::RemoteProfile;
use crate::domain::ports::RequestSigner;
use crate::utils::error::{Result, SyncError};

/// Request signer backed by the profile's auth section: either a prebuilt
/// Authorization header, or an NLAuth-style key/secret pair. Signing is
/// opaque to the rest of the crate; the only contract is failing with a
/// typed error before anything is sent when credentials are absent.
#[derive(Debug, Clone)]
pub struct ProfileSigner {
    profile_name: String,
    header: Option<String>,
    key: Option<String>,
    secret: Option<String>,
}

impl ProfileSigner {
    pub fn from_profile(profile: &RemoteProfile) -> Self {
        let auth = profile.auth.as_ref();
        Self {
            profile_name: profile.profile.name.clone(),
            header: auth.and_then(|a| configured(&a.header)),
            key: auth.and_then(|a| configured(&a.key)),
            secret: auth.and_then(|a| configured(&a.secret)),
        }
    }
}

/// Treats blank values and unresolved `${VAR}` references as absent.
fn configured(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && !v.starts_with("${"))
        .map(|v| v.to_string())
}

impl RequestSigner for ProfileSigner {
    fn sign(&self, _method: &str, _url: &str, _params: &[(String, String)]) -> Result<String> {
        if let Some(header) = &self.header {
            return Ok(header.clone());
        }
        if let (Some(key), Some(secret)) = (&self.key, &self.secret) {
            return Ok(format!(
                "NLAuth nlauth_key={}, nlauth_secret={}",
                key, secret
            ));
        }
        Err(SyncError::MissingCredentials {
            profile: self.profile_name.clone(),
        })
    }

    fn has_credentials(&self) -> bool {
        self.header.is_some() || (self.key.is_some() && self.secret.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::profile::RemoteProfile;

    fn profile(auth: &str) -> RemoteProfile {
        let toml_content = format!(
            r#"
[profile]
name = "test"

[remote]
endpoint = "https://erp.example.com/restlet"
script_id = "1"
deploy_id = "1"

{}
"#,
            auth
        );
        RemoteProfile::from_toml_str(&toml_content).unwrap()
    }

    #[test]
    fn test_prebuilt_header_wins() {
        let signer =
            ProfileSigner::from_profile(&profile("[auth]\nheader = \"NLAuth account=1\""));
        assert!(signer.has_credentials());
        assert_eq!(signer.sign("POST", "u", &[]).unwrap(), "NLAuth account=1");
    }

    #[test]
    fn test_key_secret_pair() {
        let signer =
            ProfileSigner::from_profile(&profile("[auth]\nkey = \"k1\"\nsecret = \"s1\""));
        assert!(signer.has_credentials());
        let header = signer.sign("POST", "u", &[]).unwrap();
        assert!(header.contains("nlauth_key=k1"));
    }

    #[test]
    fn test_missing_credentials_fail_fast() {
        let signer = ProfileSigner::from_profile(&profile(""));
        assert!(!signer.has_credentials());
        assert!(matches!(
            signer.sign("POST", "u", &[]),
            Err(SyncError::MissingCredentials { .. })
        ));
    }

    #[test]
    fn test_unresolved_env_reference_counts_as_absent() {
        let signer = ProfileSigner::from_profile(&profile(
            "[auth]\nheader = \"${UNSET_SYNC_AUTH_HEADER}\"",
        ));
        assert!(!signer.has_credentials());
    }
}
