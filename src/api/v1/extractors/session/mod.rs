/*!
 * Session extractor
 *
 * Responsibility:
 * - 認証済みリクエストの Session を handler に提供する
 * - Session の型と導出ロジックは services::auth::identity 側
 */

mod core;

pub use core::CurrentSession;
