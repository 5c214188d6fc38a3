//! User-facing strings. The app speaks Arabic; every failure a user can see
//! goes through here so raw vendor text never leaks into the result slot.

use crate::gemini::GenerateError;
use crate::sync::SyncError;

pub const MISSING_KEY: &str =
    "خطأ في الإعدادات: مفتاح API للذكاء الاصطناعي غير موجود. يرجى مراجعة المسؤول.";
pub const INVALID_KEY: &str = "مفتاح API المستخدم غير صالح. يرجى التحقق منه في الإعدادات.";
pub const MODEL_OVERLOADED: &str = "النموذج مشغول حاليًا. يرجى المحاولة مرة أخرى بعد قليل.";

pub const SUBSCRIPTION_PROMPT: &str =
    "لعرض النتيجة، يرجى الاشتراك أولاً. انقر على الزر أدناه للاشتراك، وبعدها سيبدأ إعلان قصير ثم تظهر نتيجتك.";
pub const RESULT_SAVED: &str = "👍 تم حفظ النتيجة بنجاح!";
pub const LOGIN_FAILED: &str = "اسم المستخدم أو كلمة المرور غير صحيحة";

/// Localized display text for a terminal generation failure. Stored in the
/// same slot a successful result would occupy.
pub fn generation_failure(err: &GenerateError) -> String {
    match err {
        GenerateError::MissingKey => MISSING_KEY.to_string(),
        GenerateError::InvalidKey => format!("فشل الاتصال بالخدمة: {INVALID_KEY}"),
        GenerateError::Overloaded(_) => format!("فشل الاتصال بالخدمة: {MODEL_OVERLOADED}"),
        GenerateError::Api { code, message } => {
            format!("فشل الاتصال بالخدمة (خطأ {code}): {message}")
        }
        GenerateError::Network(detail) | GenerateError::Malformed(detail) => {
            format!("عذراً، حدث خطأ غير متوقع: {detail}")
        }
    }
}

/// Localized display text for a remote-store failure. Token problems and
/// missing documents get their own phrasing so the operator knows whether to
/// fix the token or the URL.
pub fn sync_failure(err: &SyncError) -> String {
    match err {
        SyncError::MissingConfig => "رابط Gist ورمز الوصول مطلوبان.".to_string(),
        SyncError::InvalidUrl => {
            "رابط Gist غير صالح. لم يتمكن من استخراج معرف Gist أو اسم الملف.".to_string()
        }
        SyncError::Unauthorized => {
            "تم رفض رمز الوصول. يرجى التحقق من صلاحية الرمز وأذوناته.".to_string()
        }
        SyncError::NotFound => "لم يتم العثور على المستند. يرجى التحقق من رابط Gist.".to_string(),
        SyncError::Http { status, detail } => {
            format!("فشل الاتصال بـ Gist (الحالة {status}): {detail}")
        }
        SyncError::Network(detail) => format!("تعذر الاتصال بالشبكة: {detail}"),
        SyncError::Malformed(detail) => format!("تعذر قراءة المستند: {detail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_message_never_carries_raw_detail() {
        assert_eq!(generation_failure(&GenerateError::MissingKey), MISSING_KEY);
    }

    #[test]
    fn token_and_url_problems_read_differently() {
        let auth = sync_failure(&SyncError::Unauthorized);
        let missing = sync_failure(&SyncError::NotFound);
        assert_ne!(auth, missing);
        assert!(auth.contains("رمز"));
        assert!(missing.contains("رابط"));
    }

    #[test]
    fn api_failures_surface_code_and_message() {
        let msg = generation_failure(&GenerateError::Api {
            code: 400,
            message: "bad request".into(),
        });
        assert!(msg.contains("400"));
        assert!(msg.contains("bad request"));
    }
}
