use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlCredentialRepo {
    pool: MySqlPool,
}

impl MySqlCredentialRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlCredentialRepo { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<CredentialRecord, StoreError> {
        let decode = |e| StoreError::new("decode users row", e);

        let user_id: i64 = row.try_get("id").map_err(decode)?;
        let username: String = row.try_get("username").map_err(decode)?;
        let password_hash: String = row.try_get("password").map_err(decode)?;
        let display_name: Option<String> = row.try_get("realname").map_err(decode)?;
        let role: Option<String> = row.try_get("role").map_err(decode)?;
        let department_id: Option<i64> = row.try_get("department_id").map_err(decode)?;
        let status: i64 = row.try_get("status").map_err(decode)?;

        Ok(CredentialRecord {
            user_id: UserId(user_id),
            username,
            password_hash,
            status: AccountStatus::from_code(status),
            display_name,
            role,
            department_id,
        })
    }
}

#[async_trait::async_trait]
impl CredentialRepo for MySqlCredentialRepo {
    async fn find_active_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT CAST(id AS SIGNED) AS id, username, password, realname, role,
       CAST(department_id AS SIGNED) AS department_id, CAST(status AS SIGNED) AS status
FROM users
WHERE username = ? AND status = ?
LIMIT 1
"#,
        )
        .bind(username)
        .bind(AccountStatus::Active.code())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::new("query users", e))?;

        row_opt.map(Self::row_to_record).transpose()
    }
}
