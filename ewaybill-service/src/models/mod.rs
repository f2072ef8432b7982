//! Wire models for the e-way bill API.
//!
//! These mirror the authority's schema (integer state codes, `dd/mm/yyyy`
//! dates, coded enumerations) and are kept distinct from the internal
//! document model; callers map between the two.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Longest transport distance the authority accepts, in km.
pub const MAX_TRANS_DISTANCE_KM: u32 = 4000;

/// Direction of the supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyType {
    #[serde(rename = "O")]
    Outward,
    #[serde(rename = "I")]
    Inward,
}

/// Sub-supply classification codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubSupplyType {
    Supply,
    Import,
    Export,
    JobWork,
    OwnUse,
    SalesReturn,
    Others,
    Exhibition,
}

impl SubSupplyType {
    pub fn code(&self) -> u8 {
        match self {
            SubSupplyType::Supply => 1,
            SubSupplyType::Import => 2,
            SubSupplyType::Export => 3,
            SubSupplyType::JobWork => 4,
            SubSupplyType::OwnUse => 5,
            SubSupplyType::SalesReturn => 7,
            SubSupplyType::Others => 8,
            SubSupplyType::Exhibition => 12,
        }
    }
}

impl Serialize for SubSupplyType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for SubSupplyType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(SubSupplyType::Supply),
            2 => Ok(SubSupplyType::Import),
            3 => Ok(SubSupplyType::Export),
            4 => Ok(SubSupplyType::JobWork),
            5 => Ok(SubSupplyType::OwnUse),
            7 => Ok(SubSupplyType::SalesReturn),
            8 => Ok(SubSupplyType::Others),
            12 => Ok(SubSupplyType::Exhibition),
            other => Err(serde::de::Error::custom(format!(
                "unknown sub-supply code {}",
                other
            ))),
        }
    }
}

/// Source document kind backing the movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "INV")]
    Invoice,
    #[serde(rename = "CHL")]
    Challan,
    #[serde(rename = "BIL")]
    BillOfSupply,
    #[serde(rename = "OTH")]
    Others,
}

/// Mode of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMode {
    #[serde(rename = "1")]
    Road,
    #[serde(rename = "2")]
    Rail,
    #[serde(rename = "3")]
    Air,
    #[serde(rename = "4")]
    Ship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleType {
    #[serde(rename = "R")]
    Regular,
    #[serde(rename = "O")]
    OverDimensional,
}

/// Cancellation reason codes accepted by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Duplicate,
    OrderCancelled,
    DataEntryMistake,
    Others,
}

impl CancelReason {
    pub fn code(&self) -> u8 {
        match self {
            CancelReason::Duplicate => 1,
            CancelReason::OrderCancelled => 2,
            CancelReason::DataEntryMistake => 3,
            CancelReason::Others => 4,
        }
    }
}

impl Serialize for CancelReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Part B vehicle-update reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleUpdateReason {
    Breakdown,
    Transhipment,
    Others,
    FirstTime,
}

impl VehicleUpdateReason {
    pub fn code(&self) -> u8 {
        match self {
            VehicleUpdateReason::Breakdown => 1,
            VehicleUpdateReason::Transhipment => 2,
            VehicleUpdateReason::Others => 3,
            VehicleUpdateReason::FirstTime => 4,
        }
    }
}

impl Serialize for VehicleUpdateReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// One item row on the bill.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EwbItem {
    pub product_name: String,
    #[validate(length(min = 4, max = 8))]
    pub hsn_code: String,
    pub quantity: Decimal,
    pub qty_unit: String,
    pub taxable_amount: Decimal,
    pub cgst_rate: Decimal,
    pub sgst_rate: Decimal,
    pub igst_rate: Decimal,
    pub cess_rate: Decimal,
}

/// Generate request ("Part A" plus optional "Part B" vehicle details).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateEwbRequest {
    pub supply_type: SupplyType,
    pub sub_supply_type: SubSupplyType,
    pub doc_type: DocumentType,
    pub doc_no: String,
    /// `dd/mm/yyyy`.
    pub doc_date: String,
    #[validate(length(equal = 15))]
    pub from_gstin: String,
    pub from_place: String,
    pub from_state_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_gstin: Option<String>,
    pub to_place: String,
    pub to_state_code: u8,
    /// Km; the authority rejects anything over 4000, so it is enforced
    /// locally before a request is sent.
    #[validate(range(max = 4000))]
    pub trans_distance: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trans_mode: Option<TransportMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transporter_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<VehicleType>,
    #[validate(length(min = 1), nested)]
    pub item_list: Vec<EwbItem>,
    pub total_value: Decimal,
    pub cgst_value: Decimal,
    pub sgst_value: Decimal,
    pub igst_value: Decimal,
    pub cess_value: Decimal,
    pub total_inv_value: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateEwbResponse {
    pub eway_bill_no: u64,
    pub eway_bill_date: String,
    #[serde(default)]
    pub valid_upto: Option<String>,
}

/// Full bill record as returned by fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EwbDetail {
    pub ewb_no: u64,
    pub ewb_date: String,
    /// "ACT" while active, "CNL" after cancellation.
    pub status: String,
    pub doc_no: String,
    pub from_gstin: String,
    #[serde(default)]
    pub to_gstin: Option<String>,
    pub total_invoice_value: Decimal,
    #[serde(default)]
    pub valid_upto: Option<String>,
    #[serde(default)]
    pub vehicle_no: Option<String>,
}

/// Part B update: new vehicle for an already-issued bill.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    pub ewb_no: u64,
    #[validate(length(min = 7, max = 11))]
    pub vehicle_no: String,
    pub from_place: String,
    pub from_state: u8,
    pub trans_mode: TransportMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<VehicleUpdateReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_rem: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleResponse {
    pub veh_upd_date: String,
    #[serde(default)]
    pub valid_upto: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelEwbRequest {
    pub ewb_no: u64,
    pub cancel_rsn_code: CancelReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_rmrk: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelEwbResponse {
    pub cancel_date: String,
}
