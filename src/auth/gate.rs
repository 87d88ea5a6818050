//! Device-local biometric confirmation.
//!
//! This is a UX step before a status change is committed. It runs entirely on
//! the requesting device and proves nothing to anyone else.

use log::warn;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricKind {
    Fingerprint,
    FacialRecognition,
    Iris,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn fallback_label(self) -> &'static str {
        match self {
            Platform::Ios => "Use Passcode",
            Platform::Android => "Use PIN/Password",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOptions {
    pub prompt_message: String,
    pub fallback_label: String,
    pub cancel_label: String,
    pub disable_device_fallback: bool,
}

/// What the platform dialog reported. `error` carries the platform's code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlatformAuthResult {
    pub success: bool,
    pub error: Option<String>,
    pub authentication_type: Option<BiometricKind>,
}

/// The platform authentication API. There is no timeout on `authenticate`;
/// it resolves when the user answers or dismisses the dialog.
pub trait Authenticator {
    fn has_hardware(&self) -> impl Future<Output = bool>;

    fn is_enrolled(&self) -> impl Future<Output = bool>;

    fn supported_types(&self) -> impl Future<Output = Vec<BiometricKind>>;

    fn authenticate(&self, options: &PromptOptions) -> impl Future<Output = PlatformAuthResult>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication was cancelled")]
    Cancelled,
    #[error("Authentication was interrupted by the system")]
    SystemCancelled,
    #[error("Authentication failed. Please try again")]
    Failed,
    #[error("Fallback authentication was used")]
    FallbackUsed,
    #[error("No biometric authentication is enrolled on this device")]
    NotEnrolled,
    #[error("Biometric authentication is not available on this device")]
    NotAvailable,
    #[error("No passcode is set on this device")]
    PasscodeNotSet,
    #[error("Fingerprint scanner is not available")]
    FingerprintScannerUnavailable,
    #[error("Face ID scanner is not available")]
    FaceIdScannerUnavailable,
    /// The platform reported failure without a code.
    #[error("Authentication failed")]
    Unspecified,
    #[error("Authentication failed")]
    Other(String),
}

impl AuthError {
    pub fn from_code(code: &str) -> Self {
        match code {
            "UserCancel" => AuthError::Cancelled,
            "SystemCancel" => AuthError::SystemCancelled,
            "AuthenticationFailed" => AuthError::Failed,
            "UserFallback" => AuthError::FallbackUsed,
            "NotEnrolled" => AuthError::NotEnrolled,
            "NotAvailable" => AuthError::NotAvailable,
            "PasscodeNotSet" => AuthError::PasscodeNotSet,
            "FingerprintScannerUnavailable" => AuthError::FingerprintScannerUnavailable,
            "FaceIDScannerUnavailable" => AuthError::FaceIdScannerUnavailable,
            other => AuthError::Other(other.to_string()),
        }
    }

    /// Cancellation and fallback are the user's own choice and get no dialog.
    pub fn should_alert(&self) -> bool {
        !matches!(self, AuthError::Cancelled | AuthError::FallbackUsed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub success: bool,
    pub error: Option<AuthError>,
    pub authentication_type: Option<BiometricKind>,
}

impl AuthOutcome {
    fn failed(error: AuthError) -> Self {
        Self {
            success: false,
            error: Some(error),
            authentication_type: None,
        }
    }
}

pub struct BiometricGate<A> {
    authenticator: A,
    platform: Platform,
}

impl<A: Authenticator> BiometricGate<A> {
    pub fn new(authenticator: A, platform: Platform) -> Self {
        Self {
            authenticator,
            platform,
        }
    }

    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    pub async fn is_available(&self) -> bool {
        self.authenticator.has_hardware().await && self.authenticator.is_enrolled().await
    }

    pub async fn supported_types(&self) -> Vec<BiometricKind> {
        self.authenticator.supported_types().await
    }

    /// User-facing name for the biometric method. Every kind reads "Biometrics".
    pub fn type_name(&self, _kind: Option<BiometricKind>) -> &'static str {
        "Biometrics"
    }

    pub async fn authenticate(&self, reason: &str) -> AuthOutcome {
        if !self.is_available().await {
            return AuthOutcome::failed(AuthError::NotAvailable);
        }

        let options = PromptOptions {
            prompt_message: reason.to_string(),
            fallback_label: self.platform.fallback_label().to_string(),
            cancel_label: "Cancel".to_string(),
            disable_device_fallback: false,
        };
        let result = self.authenticator.authenticate(&options).await;
        if result.success {
            return AuthOutcome {
                success: true,
                error: None,
                authentication_type: result.authentication_type,
            };
        }
        let error = result
            .error
            .as_deref()
            .map(AuthError::from_code)
            .unwrap_or(AuthError::Unspecified);
        if let AuthError::Other(code) = &error {
            warn!("Unrecognised authentication error code: {code}");
        }
        AuthOutcome::failed(error)
    }

    /// Prompts with "Use Biometrics to {action} this memo".
    pub async fn authenticate_for_memo_action(&self, action: &str) -> AuthOutcome {
        let kind = self.supported_types().await.first().copied();
        let reason = format!("Use {} to {action} this memo", self.type_name(kind));
        self.authenticate(&reason).await
    }
}

/// Authenticator for hosts with no biometric hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBiometrics;

impl Authenticator for NoBiometrics {
    async fn has_hardware(&self) -> bool {
        false
    }

    async fn is_enrolled(&self) -> bool {
        false
    }

    async fn supported_types(&self) -> Vec<BiometricKind> {
        Vec::new()
    }

    async fn authenticate(&self, _options: &PromptOptions) -> PlatformAuthResult {
        PlatformAuthResult {
            success: false,
            error: Some("NotAvailable".into()),
            authentication_type: None,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Authenticator that answers every prompt with a fixed result and records
    /// the prompts it was shown.
    pub(crate) struct ScriptedAuthenticator {
        pub available: bool,
        pub result: PlatformAuthResult,
        pub prompts: Mutex<Vec<PromptOptions>>,
    }

    impl ScriptedAuthenticator {
        pub(crate) fn answering(result: PlatformAuthResult) -> Self {
            Self {
                available: true,
                result,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn succeeding() -> Self {
            Self::answering(PlatformAuthResult {
                success: true,
                error: None,
                authentication_type: Some(BiometricKind::Fingerprint),
            })
        }

        pub(crate) fn failing(code: &str) -> Self {
            Self::answering(PlatformAuthResult {
                success: false,
                error: Some(code.to_string()),
                authentication_type: None,
            })
        }

        pub(crate) fn unavailable() -> Self {
            Self {
                available: false,
                ..Self::succeeding()
            }
        }

        pub(crate) fn prompt_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    impl Authenticator for ScriptedAuthenticator {
        async fn has_hardware(&self) -> bool {
            self.available
        }

        async fn is_enrolled(&self) -> bool {
            self.available
        }

        async fn supported_types(&self) -> Vec<BiometricKind> {
            vec![BiometricKind::Fingerprint]
        }

        async fn authenticate(&self, options: &PromptOptions) -> PlatformAuthResult {
            self.prompts.lock().unwrap().push(options.clone());
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn success_reports_authentication_type() {
        let gate = BiometricGate::new(ScriptedAuthenticator::succeeding(), Platform::Ios);
        let outcome = gate.authenticate("Authenticate to continue").await;
        assert!(outcome.success);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.authentication_type, Some(BiometricKind::Fingerprint));

        let prompts = gate.authenticator().prompts.lock().unwrap();
        assert_eq!(prompts[0].fallback_label, "Use Passcode");
        assert_eq!(prompts[0].cancel_label, "Cancel");
        assert!(!prompts[0].disable_device_fallback);
    }

    #[tokio::test]
    async fn unavailable_device_is_never_prompted() {
        let gate = BiometricGate::new(ScriptedAuthenticator::unavailable(), Platform::Android);
        assert!(!gate.is_available().await);
        let outcome = gate.authenticate("Authenticate to continue").await;
        assert!(!outcome.success);
        assert_eq!(outcome.error, Some(AuthError::NotAvailable));
        assert_eq!(gate.authenticator().prompt_count(), 0);
    }

    #[tokio::test]
    async fn memo_action_prompt_names_the_action() {
        let gate = BiometricGate::new(ScriptedAuthenticator::succeeding(), Platform::Android);
        gate.authenticate_for_memo_action("approve").await;
        let prompts = gate.authenticator().prompts.lock().unwrap();
        assert_eq!(prompts[0].prompt_message, "Use Biometrics to approve this memo");
        assert_eq!(prompts[0].fallback_label, "Use PIN/Password");
    }

    #[tokio::test]
    async fn platform_error_codes_map_to_messages() {
        let gate = BiometricGate::new(ScriptedAuthenticator::failing("UserCancel"), Platform::Ios);
        let outcome = gate.authenticate("x").await;
        let error = outcome.error.unwrap();
        assert_eq!(error, AuthError::Cancelled);
        assert_eq!(error.to_string(), "Authentication was cancelled");
        assert!(!error.should_alert());

        let gate = BiometricGate::new(
            ScriptedAuthenticator::failing("FaceIDScannerUnavailable"),
            Platform::Ios,
        );
        let error = gate.authenticate("x").await.error.unwrap();
        assert_eq!(error.to_string(), "Face ID scanner is not available");
        assert!(error.should_alert());
    }

    #[tokio::test]
    async fn failure_without_code_is_generic() {
        let gate = BiometricGate::new(
            ScriptedAuthenticator::answering(PlatformAuthResult::default()),
            Platform::Ios,
        );
        let error = gate.authenticate("x").await.error.unwrap();
        assert_eq!(error, AuthError::Unspecified);
        assert_eq!(error.to_string(), "Authentication failed");
        assert!(error.should_alert());
        assert_eq!(
            AuthError::from_code("lockout").to_string(),
            "Authentication failed"
        );
        assert!(!AuthError::FallbackUsed.should_alert());
    }

    #[tokio::test]
    async fn system_cancel_is_still_alerted() {
        let gate = BiometricGate::new(ScriptedAuthenticator::failing("SystemCancel"), Platform::Ios);
        let error = gate.authenticate("x").await.error.unwrap();
        assert_eq!(error, AuthError::SystemCancelled);
        assert_eq!(error.to_string(), "Authentication was interrupted by the system");
        assert!(error.should_alert());
    }

    #[test]
    fn auth_errors_are_std_errors() {
        let boxed: Box<dyn std::error::Error> = Box::new(AuthError::PasscodeNotSet);
        assert_eq!(boxed.to_string(), "No passcode is set on this device");
    }

    #[tokio::test]
    async fn no_biometrics_is_unavailable() {
        let gate = BiometricGate::new(NoBiometrics, Platform::Android);
        assert!(!gate.is_available().await);
        assert!(gate.supported_types().await.is_empty());
    }
}
