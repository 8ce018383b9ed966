/*
 * Responsibility
 * - middleware の公開インターフェース (re-export)
 * - auth: Bearer トークンの検証
 * - http: 通信レベルの layer (request id / trace / limit / timeout)
 */
pub mod auth;
pub mod http;
