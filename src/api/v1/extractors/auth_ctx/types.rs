/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - Built from the user store on every request, not from the token payload,
 *   so role changes and deleted accounts take effect immediately
 * - Never carries the password hash
 */
use crate::repos::user_repo::UserProfile;
use crate::services::auth::Role;
use crate::services::ids::UserId;

/// 認証済みのリクエストに付与されるコンテキスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
    pub name: String,
    pub email: String,
}

impl From<UserProfile> for Identity {
    fn from(user: UserProfile) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            name: user.name,
            email: user.email,
        }
    }
}
