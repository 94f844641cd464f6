//! Demo accounts for development databases

use shared::models::Role;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::services::auth::hash_password;

struct DemoAccount {
    username: &'static str,
    password: &'static str,
    role: Role,
    full_name: &'static str,
    phone: &'static str,
    position: &'static str,
}

const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        username: "admin",
        password: "admin123",
        role: Role::Owner,
        full_name: "Quản trị viên",
        phone: "0901234567",
        position: "Quản lý",
    },
    DemoAccount {
        username: "manager",
        password: "manager123",
        role: Role::Admin,
        full_name: "Nguyễn Văn Manager",
        phone: "0912345678",
        position: "Quản lý ca",
    },
    DemoAccount {
        username: "staff",
        password: "staff123",
        role: Role::Staff,
        full_name: "Trần Thị Staff",
        phone: "0923456789",
        position: "Phục vụ",
    },
    DemoAccount {
        username: "kitchen",
        password: "kitchen123",
        role: Role::Kitchen,
        full_name: "Lê Văn Bếp",
        phone: "0934567890",
        position: "Đầu bếp",
    },
    DemoAccount {
        username: "cashier",
        password: "cashier123",
        role: Role::Cashier,
        full_name: "Phạm Thị Thu Ngân",
        phone: "0945678901",
        position: "Thu ngân",
    },
];

/// Insert the demo accounts that do not exist yet
pub async fn seed_demo_accounts(db: &PgPool) -> AppResult<usize> {
    let mut created = 0;

    for account in DEMO_ACCOUNTS {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(account.username)
        .fetch_one(db)
        .await?;

        if exists {
            continue;
        }

        let password_hash = hash_password(account.password)?;
        let mut tx = db.begin().await?;

        let user_id = sqlx::query_scalar::<_, uuid::Uuid>(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(account.username)
        .bind(&password_hash)
        .bind(account.role.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO employees (user_id, full_name, phone, position)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(account.full_name)
        .bind(account.phone)
        .bind(account.position)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        created += 1;
    }

    Ok(created)
}
