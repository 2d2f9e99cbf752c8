//! # ماژول توابع کمکی (Utilities)
//!
//! الفبای short code، تولید کد تصادفی، چک scheme آدرس و encode کردن `Location`.

use std::borrow::Cow;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use rand::Rng;

// =====================================
// Constants
// =====================================
/// کاراکترهای مجاز برای short code (۶۲ کاراکتر)
///
/// ترتیب همون ترتیب `base62` هست: اول ارقام، بعد حروف بزرگ، بعد کوچک
pub const SHORT_CODE_CHARS: &[u8] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// scheme‌های قابل قبول برای آدرس اصلی
pub const ALLOWED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// بایت‌هایی که توی header `Location` باید `%XX` بشن
///
/// غیر ASCII همیشه encode میشه؛ `%` موجود دست نمیخوره.
const LOCATION_UNSAFE: &AsciiSet = &CONTROLS.add(b' ');

// =====================================
// Short Code Generation
// =====================================
/// تولید short code تصادفی با طول مشخص
///
/// # مفاهیم:
/// - `rand::thread_rng()`: تولیدکننده اعداد تصادفی برای این thread
/// - `gen_range`: هر کاراکتر مستقل و یکنواخت از الفبا انتخاب میشه
///
/// # مثال
/// ```rust
/// use url_shortener::utils::generate_short_code_with_length;
///
/// let code = generate_short_code_with_length(6);
/// assert_eq!(code.len(), 6);
/// ```
#[must_use]
pub fn generate_short_code_with_length(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..SHORT_CODE_CHARS.len());
            SHORT_CODE_CHARS[idx] as char
        })
        .collect()
}

/// آیا این رشته یه short code معتبر با طول داده شده‌ست؟
#[must_use]
pub fn is_short_code(code: &str, length: usize) -> bool {
    code.len() == length && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

// =====================================
// Validation Functions
// =====================================
/// آیا آدرس با `http://` یا `https://` شروع میشه؟
///
/// فقط prefix چک میشه؛ بقیه آدرس همون‌طور که هست ذخیره میشه.
///
/// # مثال
/// ```rust
/// use url_shortener::utils::has_http_scheme;
///
/// assert!(has_http_scheme("https://example.com"));
/// assert!(!has_http_scheme("ftp://example.com"));
/// assert!(!has_http_scheme(""));
/// ```
#[must_use]
pub fn has_http_scheme(url: &str) -> bool {
    ALLOWED_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}

// =====================================
// Redirect Target
// =====================================
/// آدرس ذخیره شده به شکلی که توی header `Location` جا بشه
///
/// کاراکترهای کنترلی، فاصله و بایت‌های غیر ASCII به `%XX` تبدیل میشن.
///
/// # مثال
/// ```rust
/// use url_shortener::utils::encode_location;
///
/// assert_eq!(encode_location("https://example.com/a b"), "https://example.com/a%20b");
/// assert_eq!(encode_location("https://example.com/café"), "https://example.com/caf%C3%A9");
/// ```
#[must_use]
pub fn encode_location(url: &str) -> Cow<'_, str> {
    utf8_percent_encode(url, LOCATION_UNSAFE).into()
}
