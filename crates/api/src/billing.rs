//! Billing provider client for checkout sessions.
//!
//! Talks to a Stripe-style REST API: form-encoded requests, bearer secret
//! key, JSON responses. Customers are keyed by email so repeated checkouts
//! reuse the same provider customer.

use serde::Deserialize;
use thiserror::Error;
use tradelog_shared::config::BillingConfig;

/// Errors from the billing provider.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Transport-level failure.
    #[error("billing request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider rejected the request.
    #[error("billing provider error: {0}")]
    Upstream(String),

    /// Coupon code does not exist or is no longer valid.
    #[error("invalid coupon: {0}")]
    InvalidCoupon(String),
}

#[derive(Debug, Deserialize)]
struct CustomerList {
    data: Vec<Customer>,
}

#[derive(Debug, Deserialize)]
struct Customer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Coupon {
    #[serde(default)]
    valid: bool,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    url: String,
}

/// Parameters for a checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutParams {
    /// Customer email, used to find or create the provider customer.
    pub email: String,
    /// Plan being purchased: advanced | pro.
    pub plan_id: String,
    /// monthly | yearly.
    pub billing_cycle: String,
    /// Optional coupon code, validated before use.
    pub coupon_code: Option<String>,
    /// Whether the options-flow addon is included.
    pub addon_option_flow: bool,
}

/// Client for the billing provider's REST API.
#[derive(Debug, Clone)]
pub struct BillingClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
    success_url: String,
    cancel_url: String,
}

impl BillingClient {
    /// Creates a client from billing configuration.
    #[must_use]
    pub fn from_config(config: &BillingConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        }
    }

    /// Finds the provider customer for an email, creating one if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails.
    pub async fn find_or_create_customer(&self, email: &str) -> Result<String, BillingError> {
        let response = self
            .http
            .get(format!("{}/customers", self.base_url))
            .bearer_auth(&self.secret_key)
            .query(&[("email", email), ("limit", "1")])
            .send()
            .await?;

        if response.status().is_success() {
            let list: CustomerList = response.json().await?;
            if let Some(customer) = list.data.into_iter().next() {
                return Ok(customer.id);
            }
        } else {
            return Err(Self::upstream_error(response).await);
        }

        let response = self
            .http
            .post(format!("{}/customers", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&[("email", email)])
            .send()
            .await?;

        if response.status().is_success() {
            let customer: Customer = response.json().await?;
            Ok(customer.id)
        } else {
            Err(Self::upstream_error(response).await)
        }
    }

    /// Validates a coupon code against the provider.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCoupon` when the code is unknown or expired.
    pub async fn validate_coupon(&self, code: &str) -> Result<(), BillingError> {
        let response = self
            .http
            .get(format!("{}/coupons/{code}", self.base_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BillingError::InvalidCoupon(code.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::upstream_error(response).await);
        }

        let coupon: Coupon = response.json().await?;
        if coupon.valid {
            Ok(())
        } else {
            Err(BillingError::InvalidCoupon(code.to_string()))
        }
    }

    /// Creates a checkout session and returns the hosted checkout URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the coupon is invalid or the provider call
    /// fails.
    pub async fn create_checkout_session(
        &self,
        params: &CheckoutParams,
    ) -> Result<String, BillingError> {
        let customer_id = self.find_or_create_customer(&params.email).await?;

        if let Some(code) = &params.coupon_code {
            self.validate_coupon(code).await?;
        }

        let mut form: Vec<(String, String)> = vec![
            ("customer".into(), customer_id),
            ("mode".into(), "subscription".into()),
            ("success_url".into(), self.success_url.clone()),
            ("cancel_url".into(), self.cancel_url.clone()),
            (
                "line_items[0][price]".into(),
                price_lookup_key(&params.plan_id, &params.billing_cycle),
            ),
            ("line_items[0][quantity]".into(), "1".into()),
        ];
        if params.addon_option_flow {
            form.push((
                "line_items[1][price]".into(),
                price_lookup_key("option-flow-addon", &params.billing_cycle),
            ));
            form.push(("line_items[1][quantity]".into(), "1".into()));
        }
        if let Some(code) = &params.coupon_code {
            form.push(("discounts[0][coupon]".into(), code.clone()));
        }

        let response = self
            .http
            .post(format!("{}/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        if response.status().is_success() {
            let session: CheckoutSession = response.json().await?;
            Ok(session.url)
        } else {
            Err(Self::upstream_error(response).await)
        }
    }

    async fn upstream_error(response: reqwest::Response) -> BillingError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        BillingError::Upstream(format!("status {status}: {body}"))
    }
}

/// Price lookup key as configured in the provider dashboard.
fn price_lookup_key(plan_id: &str, billing_cycle: &str) -> String {
    let cycle = if billing_cycle.eq_ignore_ascii_case("yearly") {
        "yearly"
    } else {
        "monthly"
    };
    format!("{}_{cycle}", plan_id.trim().to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_lookup_key() {
        assert_eq!(price_lookup_key("Advanced", "monthly"), "advanced_monthly");
        assert_eq!(price_lookup_key("pro", "YEARLY"), "pro_yearly");
        // anything unrecognized falls back to monthly
        assert_eq!(price_lookup_key("pro", "weekly"), "pro_monthly");
    }
}
