//! Network and asset constants for the walletgate SDK.

/// Default platform REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.walletgate.exchange";

/// Symbol of the native asset handled by the deposit flow.
pub const NATIVE_ASSET: &str = "ETH";

/// Base-unit decimals of the native asset (1 ETH = 10^18 wei).
pub const NATIVE_DECIMALS: u32 = 18;

/// Network label reported to the platform backend.
pub const NETWORK_NAME: &str = "ethereum";

/// Deposit source label reported to the platform backend.
pub const NOTIFY_SOURCE: &str = "metamask";
