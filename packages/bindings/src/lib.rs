use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_payment(input_json: String) -> NapiResult<String> {
    let input: mortgage_calc_core::amortization::LoanInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_calc_core::amortization::calculate_payment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_schedule(input_json: String) -> NapiResult<String> {
    let input: mortgage_calc_core::amortization::LoanInputs =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_calc_core::amortization::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Purchase qualification
// ---------------------------------------------------------------------------

#[napi]
pub fn assess_down_payment(input_json: String) -> NapiResult<String> {
    let input: mortgage_calc_core::down_payment::DownPaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_calc_core::down_payment::analyze_down_payment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn assess_affordability(input_json: String) -> NapiResult<String> {
    let input: mortgage_calc_core::affordability::AffordabilityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_calc_core::affordability::analyze_affordability(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn default_lending_rules() -> NapiResult<String> {
    serde_json::to_string(&mortgage_calc_core::LendingRules::default()).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rent vs buy
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_rent_vs_buy(input_json: String) -> NapiResult<String> {
    let input: mortgage_calc_core::rent_vs_buy::RentVsBuyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_calc_core::rent_vs_buy::analyze_rent_vs_buy(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
