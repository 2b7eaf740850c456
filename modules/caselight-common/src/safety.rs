use regex::Regex;
use std::sync::LazyLock;

/// Replacement token for redacted spans. Matches none of the patterns below,
/// which is what makes `redact` idempotent.
pub const REDACTED: &str = "[redacted]";

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").unwrap());
static SSN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,5}\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s+(?:St|Ave|Blvd|Dr|Ln|Rd|Way|Ct|Pl|Cir|Ter)\b").unwrap()
});
static DOB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:DOB|date of birth)[:\s]+\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").unwrap()
});

// Sensitivity markers that cannot be mechanically redacted; their presence
// blocks publication in the mid-significance band instead.
static MINOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:minor child(?:ren)?|juvenile|underage)\b").unwrap());
static SEALED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:under seal|sealed by the court|filed under seal)\b").unwrap()
});
static INFORMANT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bconfidential informant\b|\bCI-\d+\b").unwrap());

/// Rewrite contact PII (phone, email, SSN, street address, date of birth)
/// to `[redacted]`. Idempotent, since the same text is re-filtered on every
/// sync pass. Pure function of its input.
pub fn redact(text: &str) -> String {
    let text = PHONE_RE.replace_all(text, REDACTED);
    let text = EMAIL_RE.replace_all(&text, REDACTED);
    let text = SSN_RE.replace_all(&text, REDACTED);
    let text = ADDRESS_RE.replace_all(&text, REDACTED);
    let text = DOB_RE.replace_all(&text, REDACTED);
    text.into_owned()
}

/// Check if text contains PII patterns. Returns descriptions of what was found.
pub fn detect_pii(text: &str) -> Vec<String> {
    let mut findings = Vec::new();

    if PHONE_RE.is_match(text) {
        findings.push("phone number detected".to_string());
    }
    if EMAIL_RE.is_match(text) {
        findings.push("email address detected".to_string());
    }
    if SSN_RE.is_match(text) {
        findings.push("SSN pattern detected".to_string());
    }
    if ADDRESS_RE.is_match(text) {
        findings.push("street address detected".to_string());
    }
    if DOB_RE.is_match(text) {
        findings.push("date of birth detected".to_string());
    }

    findings
}

/// Check for disclosure risks: residual PII plus sensitivity markers that
/// redaction cannot remove (juvenile references, sealed-filing language,
/// informant references).
pub fn detect_disclosure_risks(text: &str) -> Vec<String> {
    let mut findings = detect_pii(text);

    if MINOR_RE.is_match(text) {
        findings.push("juvenile/minor reference detected".to_string());
    }
    if SEALED_RE.is_match(text) {
        findings.push("sealed-filing language detected".to_string());
    }
    if INFORMANT_RE.is_match(text) {
        findings.push("informant reference detected".to_string());
    }

    findings
}

/// Significance thresholds for the publication-safety classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyThresholds {
    /// Records below this significance are never publishable.
    pub floor: u32,
    /// Records at or above this significance skip the text heuristics.
    pub auto_safe: u32,
}

impl Default for SafetyThresholds {
    fn default() -> Self {
        Self {
            floor: 300,
            auto_safe: 900,
        }
    }
}

/// Classify a record as publication-safe. Monotonic in `significance` for a
/// fixed text: below the floor nothing is safe, at or above `auto_safe` the
/// text heuristics are bypassed, and in between the disclosure-risk patterns
/// decide.
///
/// `hint` is the upstream pre-vetting flag (resources only). An explicit
/// `false` is never publishable. An explicit `true` skips the text
/// heuristics but still requires the significance floor.
pub fn is_public_safe(
    text: &str,
    significance: u32,
    hint: Option<bool>,
    thresholds: &SafetyThresholds,
) -> bool {
    if hint == Some(false) {
        return false;
    }
    if significance < thresholds.floor {
        return false;
    }
    if hint == Some(true) || significance >= thresholds.auto_safe {
        return true;
    }
    detect_disclosure_risks(text).is_empty()
}
