//! 仪表盘角色常量。

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_CUSTOMER: &str = "Customer";
pub const ROLE_DEALER: &str = "Dealer";
pub const ROLE_USER: &str = "User";

pub const ROLES: &[&str] = &[ROLE_ADMIN, ROLE_CUSTOMER, ROLE_DEALER, ROLE_USER];

pub fn is_known_role(role: &str) -> bool {
    ROLES.contains(&role)
}
