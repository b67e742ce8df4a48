/*
 * Responsibility
 * - HTTP API の入口 (version ごとに module を分ける)
 */
pub mod v1;
