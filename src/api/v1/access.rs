use super::error::ApiErrorCode;
use subtle::ConstantTimeEq;
use warp::{Rejection, reject};

/// Where the login form sends the browser, and how the session cookie is set.
#[derive(Debug, Clone)]
pub struct LoginFlow {
    pub login_page: String,
    pub success_redirect: String,
    pub cookie_name: String,
    pub cookie_max_age: u64,
    pub secure_cookie: bool,
}

impl LoginFlow {
    pub fn failure_location(&self, reason: &str) -> String {
        let sep = if self.login_page.contains('?') { '&' } else { '?' };
        format!("{}{}error={}", self.login_page, sep, reason)
    }

    pub fn session_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie_name, token, self.cookie_max_age
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Gate for the operator-only migration routes.
#[derive(Debug, Clone)]
pub struct OperatorAccess {
    pub enabled: bool,
    pub admin_token: Option<String>,
}

impl OperatorAccess {
    pub fn check(&self, provided: Option<&str>) -> Result<(), Rejection> {
        // Disabled routes answer exactly like unknown ones.
        if !self.enabled {
            return Err(reject::custom(ApiErrorCode::NotFound));
        }
        match (&self.admin_token, provided) {
            (None, _) => Ok(()),
            (Some(expected), Some(provided))
                if bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) =>
            {
                Ok(())
            }
            _ => Err(reject::custom(ApiErrorCode::Unauthorized)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(login_page: &str) -> LoginFlow {
        LoginFlow {
            login_page: login_page.to_string(),
            success_redirect: "/".to_string(),
            cookie_name: "sid".to_string(),
            cookie_max_age: 60,
            secure_cookie: false,
        }
    }

    #[test]
    fn failure_location_appends_indicator() {
        assert_eq!(flow("/login").failure_location("1"), "/login?error=1");
        assert_eq!(
            flow("/index?page=login").failure_location("1"),
            "/index?page=login&error=1"
        );
    }

    #[test]
    fn cookie_attributes() {
        let mut f = flow("/login");
        assert_eq!(
            f.session_cookie("abc"),
            "sid=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );
        f.secure_cookie = true;
        assert!(f.session_cookie("abc").ends_with("; Secure"));
    }

    #[test]
    fn operator_token_checks() {
        let open = OperatorAccess {
            enabled: true,
            admin_token: None,
        };
        assert!(open.check(None).is_ok());

        let guarded = OperatorAccess {
            enabled: true,
            admin_token: Some("s3cret".into()),
        };
        assert!(guarded.check(Some("s3cret")).is_ok());
        assert!(guarded.check(Some("s3cre")).is_err());
        assert!(guarded.check(None).is_err());

        let disabled = OperatorAccess {
            enabled: false,
            admin_token: None,
        };
        let rejection = disabled.check(None).unwrap_err();
        assert!(matches!(
            rejection.find::<ApiErrorCode>(),
            Some(ApiErrorCode::NotFound)
        ));
    }
}
