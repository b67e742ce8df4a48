/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (認証 / role guard) と横断的な HTTP layer (cors / http / security headers)
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
