//! HTTP client for the storefront backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    api::{
        ApiError, ApiResponse, CheckoutApi,
        envelope::RawEnvelope,
        models::{
            AddToCartRequest, ApplyCouponRequest, Availability, CheckoutOrder, CheckoutRequest,
            DonationData, FrequentlyAddedService, Notification, PaymentRecord,
            RemoveFromCartRequest, Settings, UpdateAddressRequest, UpdateBookingDateRequest,
            WalletTransaction,
        },
    },
    cart::models::{Address, AppliedCoupon, CartData, VipPlan},
    config::ApiConfig,
    coupons::Coupon,
    providers::ServiceProvider,
};

/// [`CheckoutApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCheckoutApi {
    config: ApiConfig,
    http: Client,
}

impl HttpCheckoutApi {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_seconds))
            .build()?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.api_base_url.trim_end_matches('/'))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.send(path, self.http.get(self.url(path))).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(path, self.http.post(self.url(path)).json(body))
            .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ApiError> {
        let request = match &self.config.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.inspect_err(|error| {
            warn!(path, %error, "backend request failed");
        })?;

        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RawEnvelope<serde_json::Value>>(&text)
                .ok()
                .map(|raw| ApiResponse::from(raw).message)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or(text);

            warn!(path, status = status.as_u16(), %message, "backend returned an error status");

            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let raw: RawEnvelope<T> = response.json().await?;
        let response = ApiResponse::from(raw);

        debug!(path, success = response.success, "backend responded");

        Ok(response)
    }
}

#[async_trait]
impl CheckoutApi for HttpCheckoutApi {
    async fn fetch_cart(&self) -> Result<Option<CartData>, ApiError> {
        self.get("cart").await?.into_optional_data()
    }

    async fn add_to_cart(&self, request: AddToCartRequest) -> Result<Option<CartData>, ApiError> {
        self.post("cart/add", &request).await?.into_optional_data()
    }

    async fn remove_from_cart(&self, cart_item_id: String) -> Result<Option<CartData>, ApiError> {
        self.post("cart/remove", &RemoveFromCartRequest { cart_item_id })
            .await?
            .into_optional_data()
    }

    async fn update_booking_date(
        &self,
        request: UpdateBookingDateRequest,
    ) -> Result<Option<CartData>, ApiError> {
        self.post("cart/update-date", &request)
            .await?
            .into_optional_data()
    }

    async fn update_address(&self, address_id: String) -> Result<Option<CartData>, ApiError> {
        self.post("cart/update-address", &UpdateAddressRequest { address_id })
            .await?
            .into_optional_data()
    }

    async fn apply_coupon(&self, code: String) -> Result<AppliedCoupon, ApiError> {
        self.post("cart/apply-coupon", &ApplyCouponRequest { code })
            .await?
            .into_data("apply-coupon")
    }

    async fn remove_coupon(&self) -> Result<(), ApiError> {
        self.post::<_, serde_json::Value>("cart/remove-coupon", &serde_json::json!({}))
            .await?
            .into_result()
            .map(drop)
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, ApiError> {
        Ok(self.get("coupons").await?.into_optional_data()?.unwrap_or_default())
    }

    async fn check_availability(&self) -> Result<Availability, ApiError> {
        self.get("cart/check-availability")
            .await?
            .into_data("check-availability")
    }

    async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutOrder, ApiError> {
        self.post("cart/checkout", &request)
            .await?
            .into_data("checkout")
    }

    async fn record_payment(&self, record: PaymentRecord) -> Result<(), ApiError> {
        self.post::<_, serde_json::Value>("cart/checkout/payment", &record)
            .await?
            .into_result()
            .map(drop)
    }

    async fn vip_plans(&self) -> Result<Vec<VipPlan>, ApiError> {
        Ok(self.get("vip-plans").await?.into_optional_data()?.unwrap_or_default())
    }

    async fn donation_data(&self) -> Result<Option<DonationData>, ApiError> {
        self.get("donations").await?.into_optional_data()
    }

    async fn frequently_added_services(&self) -> Result<Vec<FrequentlyAddedService>, ApiError> {
        Ok(self
            .get("services/frequently-added")
            .await?
            .into_optional_data()?
            .unwrap_or_default())
    }

    async fn addresses(&self) -> Result<Vec<Address>, ApiError> {
        Ok(self.get("addresses").await?.into_optional_data()?.unwrap_or_default())
    }

    async fn service_providers(&self) -> Result<Vec<ServiceProvider>, ApiError> {
        Ok(self
            .get("service-providers")
            .await?
            .into_optional_data()?
            .unwrap_or_default())
    }

    async fn select_service_provider(&self, provider_id: String) -> Result<(), ApiError> {
        self.post::<_, serde_json::Value>(
            "service-providers/select",
            &serde_json::json!({ "provider_id": provider_id }),
        )
        .await?
        .into_result()
        .map(drop)
    }

    async fn settings(&self) -> Result<Settings, ApiError> {
        self.get("settings").await?.into_data("settings")
    }

    async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        Ok(self
            .get("notifications")
            .await?
            .into_optional_data()?
            .unwrap_or_default())
    }

    async fn wallet_history(&self) -> Result<Vec<WalletTransaction>, ApiError> {
        Ok(self
            .get("wallet/history")
            .await?
            .into_optional_data()?
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn config(base: &str) -> ApiConfig {
        ApiConfig {
            api_base_url: base.to_string(),
            api_token: None,
            api_timeout_seconds: 5,
        }
    }

    #[test]
    fn url_joins_without_double_slash() -> TestResult {
        let api = HttpCheckoutApi::new(config("https://api.example.test/v1/"))?;

        assert_eq!(api.url("cart"), "https://api.example.test/v1/cart");

        Ok(())
    }
}
