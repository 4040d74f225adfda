// handlers/payment.rs - M-Pesa endpoints, simulated acceptance only

use serde_json::{json, Value};
use uuid::Uuid;

use crate::services::{Fields, ServiceResult};

const ACCEPTED: &str = "Success. Request accepted for processing";

/// Accept an STK push request without contacting any gateway
pub fn stk_push(fields: &Fields) -> ServiceResult {
    let checkout_request_id = Uuid::new_v4().to_string();
    let order = fields.get("orderId").cloned().unwrap_or_default();
    tracing::info!("Simulated STK push {} for order {}", checkout_request_id, order);

    Ok(json!({
        "success": true,
        "checkoutRequestId": checkout_request_id,
        "merchantRequestId": Uuid::new_v4().to_string(),
        "responseCode": "0",
        "responseDescription": ACCEPTED,
        "customerMessage": ACCEPTED,
    }))
}

/// Acknowledge a gateway callback
pub fn callback(fields: &Fields) -> ServiceResult {
    tracing::info!("M-Pesa callback received with {} field(s)", fields.len());
    let payload = Value::Object(fields.clone());
    tracing::debug!("M-Pesa callback payload: {}", payload);
    Ok(json!({ "success": true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stk_push_ids_are_fresh() {
        let first = stk_push(&Fields::new()).unwrap();
        let second = stk_push(&Fields::new()).unwrap();

        assert_eq!(first["responseCode"], "0");
        assert_eq!(first["success"], true);
        assert_ne!(first["checkoutRequestId"], second["checkoutRequestId"]);
        assert_ne!(first["checkoutRequestId"], first["merchantRequestId"]);
    }

    #[test]
    fn callback_acknowledges() {
        assert_eq!(callback(&Fields::new()).unwrap(), json!({ "success": true }));
    }

    #[test]
    fn order_id_is_optional_in_the_log_line() {
        let mut fields = Fields::new();
        fields.insert("orderId".to_string(), json!("7"));
        assert_eq!(stk_push(&fields).unwrap()["success"], true);

        fields.insert("Body".to_string(), json!({ "stkCallback": { "ResultCode": 0 } }));
        assert_eq!(callback(&fields).unwrap(), json!({ "success": true }));
    }
}
