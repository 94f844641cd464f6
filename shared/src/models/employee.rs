//! Employee positions

use super::Role;

/// Positions offered by the staff form
pub const POSITIONS: &[&str] = &["Quản lý", "Đầu bếp", "Phó bếp", "Phục vụ", "Thu ngân", "Bảo vệ"];

/// Role granted to a new hire when the form does not pick one explicitly
pub fn role_for_position(position: &str) -> Role {
    match position.trim() {
        "Quản lý" => Role::Owner,
        "Đầu bếp" | "Phó bếp" => Role::Kitchen,
        "Thu ngân" => Role::Cashier,
        _ => Role::Employee,
    }
}
