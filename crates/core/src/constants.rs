/// Base URL of the REST backend when none is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/";

/// Page size used by searches that do not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// UI locale used until the user picks one
pub const DEFAULT_LOCALE: &str = "en-US";

/// Currency amounts are shown in
pub const DEFAULT_CURRENCY: &str = "USD";

/// Session jar entry holding the bearer token
pub const DEFAULT_COOKIE_TOKEN: &str = "token";

/// Session jar entry holding the encoded user profile
pub const DEFAULT_COOKIE_USERDATA: &str = "userData";

/// Session jar entry holding the locale preference
pub const LOCALE_COOKIE: &str = "locale";

/// Decimal places used when displaying money
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;
