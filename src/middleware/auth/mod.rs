/*
 * Responsibility
 * - 認証・認可 chain
 *   - access: Bearer token → Identity (401)
 *   - roles: Identity.role が許可リストに含まれるか (403)
 * - ownership は handler 側 (services::auth::ownership) で確認する
 */
pub mod access;
pub mod roles;
