//! GSTR-1 outward-supply filing aggregation.
//!
//! Buckets a date range of invoices into the regulator's b2b / b2cl /
//! b2cs sections plus an HSN summary. B2C-Small aggregation is lossy by
//! regulatory design: individual invoices are folded into running sums.

use crate::config::GstConfig;
use crate::models::{
    B2bEntry, B2bInvoice, B2clEntry, B2clInvoice, B2csEntry, DocumentContents, FilingInvoiceItem,
    Gstr1Report, HsnEntry, HsnSummary, ItemDetail, TaxLineItem, TaxableDocument,
};
use crate::services::tax::{is_inter_state, round_money};
use chrono::{Datelike, NaiveDate};
use compliance_core::store::{Filter, Sort};
use compliance_core::{ComplianceError, RecordStore};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{instrument, warn};

const DOCUMENT_COLLECTION: &str = "documents";

/// Running sums for one b2cs bucket.
#[derive(Default)]
struct B2csSums {
    txval: Decimal,
    iamt: Decimal,
    camt: Decimal,
    samt: Decimal,
    csamt: Decimal,
}

/// Running sums for one HSN code.
#[derive(Default)]
struct HsnSums {
    desc: String,
    uqc: String,
    qty: Decimal,
    txval: Decimal,
    iamt: Decimal,
    camt: Decimal,
    samt: Decimal,
    csamt: Decimal,
}

pub struct Gstr1Builder {
    store: Arc<dyn RecordStore>,
    config: GstConfig,
}

impl Gstr1Builder {
    pub fn new(store: Arc<dyn RecordStore>, config: GstConfig) -> Self {
        Self { store, config }
    }

    /// Build the filing for all regular invoices dated within
    /// `[start_date, end_date]`. A document that cannot be read is
    /// skipped and counted; one bad record never aborts the run.
    #[instrument(skip(self))]
    pub async fn build_filing_report(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Gstr1Report, ComplianceError> {
        if end_date < start_date {
            return Err(ComplianceError::Validation(format!(
                "filing range end {} precedes start {}",
                end_date, start_date
            )));
        }

        let filter = Filter::new()
            .eq("kind", "invoice")
            .gte("date", start_date.to_string())
            .lte("date", end_date.to_string());
        let records = self
            .store
            .query(
                DOCUMENT_COLLECTION,
                filter,
                Some(Sort {
                    field: "date".into(),
                    ascending: true,
                }),
            )
            .await?;

        let mut b2b: BTreeMap<String, Vec<B2bInvoice>> = BTreeMap::new();
        let mut b2cl: BTreeMap<String, Vec<B2clInvoice>> = BTreeMap::new();
        let mut b2cs: BTreeMap<(String, Decimal, String), B2csSums> = BTreeMap::new();
        let mut hsn: BTreeMap<String, HsnSums> = BTreeMap::new();
        let mut skipped = 0u32;

        for record in records {
            let document: TaxableDocument = match serde_json::from_value(record.body) {
                Ok(doc) => doc,
                Err(err) => {
                    warn!(record_id = %record.id, error = %err, "skipping unreadable document");
                    skipped += 1;
                    continue;
                }
            };
            let TaxableDocument::Invoice(contents) = document else {
                continue;
            };
            let Some(number) = contents.number.clone() else {
                warn!(record_id = %record.id, "skipping unnumbered draft invoice");
                skipped += 1;
                continue;
            };

            let grand_total = document_value(&contents);
            let place_of_supply = place_of_supply(&contents);
            let inter_state =
                is_inter_state(&contents.seller_state_code, &contents.buyer_state_code);
            let idt = contents.date.format("%d-%m-%Y").to_string();
            let items = filing_items(&contents.line_items);

            // B2B: registered buyer, merged per counterparty GSTIN.
            if let Some(ctin) = contents.buyer_gstin.as_deref().filter(|g| g.len() == 15) {
                b2b.entry(ctin.to_string()).or_default().push(B2bInvoice {
                    inum: number,
                    idt,
                    val: grand_total,
                    pos: place_of_supply,
                    rchrg: "N".into(),
                    inv_typ: "R".into(),
                    itms: items,
                });
                accumulate_hsn(&mut hsn, &contents.line_items);
                continue;
            }

            // B2C-Large: unregistered, inter-state, above the threshold.
            if inter_state && grand_total > self.config.b2cl_threshold {
                b2cl.entry(place_of_supply).or_default().push(B2clInvoice {
                    inum: number,
                    idt,
                    val: grand_total,
                    itms: items,
                });
                accumulate_hsn(&mut hsn, &contents.line_items);
                continue;
            }

            // B2C-Small: folded into running sums, not kept per-invoice.
            let sply_ty = if inter_state { "INTER" } else { "INTRA" };
            for line in &contents.line_items {
                let rate = effective_rate(line);
                let key = (place_of_supply.clone(), rate, sply_ty.to_string());
                let sums = b2cs.entry(key).or_default();
                sums.txval += line.taxable_amount;
                sums.iamt += line.igst_amount;
                sums.camt += line.cgst_amount;
                sums.samt += line.sgst_amount;
                sums.csamt += line.cess_amount;
            }
            accumulate_hsn(&mut hsn, &contents.line_items);
        }

        Ok(Gstr1Report {
            gstin: self.config.gstin.clone(),
            fp: format!("{:02}{}", end_date.month(), end_date.year()),
            b2b: b2b
                .into_iter()
                .map(|(ctin, inv)| B2bEntry { ctin, inv })
                .collect(),
            b2cl: b2cl
                .into_iter()
                .map(|(pos, inv)| B2clEntry { pos, inv })
                .collect(),
            b2cs: b2cs
                .into_iter()
                .map(|((pos, rate, sply_ty), sums)| B2csEntry {
                    sply_ty,
                    rt: rate,
                    typ: "OE".into(),
                    pos,
                    txval: round_money(sums.txval),
                    iamt: round_money(sums.iamt),
                    camt: round_money(sums.camt),
                    samt: round_money(sums.samt),
                    csamt: round_money(sums.csamt),
                })
                .collect(),
            hsn: HsnSummary {
                data: hsn
                    .into_iter()
                    .enumerate()
                    .map(|(i, (hsn_sc, sums))| HsnEntry {
                        num: i as u32 + 1,
                        hsn_sc,
                        desc: sums.desc,
                        uqc: sums.uqc,
                        qty: sums.qty,
                        val: round_money(
                            sums.txval + sums.iamt + sums.camt + sums.samt + sums.csamt,
                        ),
                        txval: round_money(sums.txval),
                        iamt: round_money(sums.iamt),
                        camt: round_money(sums.camt),
                        samt: round_money(sums.samt),
                        csamt: round_money(sums.csamt),
                    })
                    .collect(),
            },
            skipped,
        })
    }
}

/// Place of supply for classification and reporting: the invoice's buyer
/// state code, or the seller's own state when the buyer state is absent
/// (walk-in sale taxed at origin).
fn place_of_supply(contents: &DocumentContents) -> String {
    if contents.buyer_state_code.is_empty() {
        contents.seller_state_code.clone()
    } else {
        contents.buyer_state_code.clone()
    }
}

/// Document grand total; recomputed from the lines when the stored
/// aggregate is missing.
fn document_value(contents: &DocumentContents) -> Decimal {
    if !contents.totals.grand_total.is_zero() || contents.line_items.is_empty() {
        return round_money(contents.totals.grand_total);
    }
    let total = contents.line_items.iter().fold(Decimal::ZERO, |acc, line| {
        acc + line.taxable_amount
            + line.cgst_amount
            + line.sgst_amount
            + line.igst_amount
            + line.cess_amount
    });
    round_money(total)
}

/// Effective tax rate for one line. The stored rate is authoritative;
/// back-calculation from amounts only covers records written before the
/// rate was stored, and can misclassify lines whose amounts round near a
/// statutory-rate boundary.
fn effective_rate(line: &TaxLineItem) -> Decimal {
    let tax = line.cgst_amount + line.sgst_amount + line.igst_amount;
    if !line.gst_rate.is_zero() || tax.is_zero() {
        return line.gst_rate;
    }
    if line.taxable_amount.is_zero() {
        return Decimal::ZERO;
    }
    (tax / line.taxable_amount * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn filing_items(lines: &[TaxLineItem]) -> Vec<FilingInvoiceItem> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| FilingInvoiceItem {
            num: i as u32 + 1,
            itm_det: ItemDetail {
                rt: effective_rate(line),
                txval: round_money(line.taxable_amount),
                iamt: round_money(line.igst_amount),
                camt: round_money(line.cgst_amount),
                samt: round_money(line.sgst_amount),
                csamt: round_money(line.cess_amount),
            },
        })
        .collect()
}

fn accumulate_hsn(hsn: &mut BTreeMap<String, HsnSums>, lines: &[TaxLineItem]) {
    for line in lines {
        let sums = hsn.entry(line.hsn_code.clone()).or_default();
        if sums.desc.is_empty() && !line.description.is_empty() {
            sums.desc = line.description.clone();
        }
        if sums.uqc.is_empty() && !line.unit.is_empty() {
            sums.uqc = line.unit.clone();
        }
        sums.qty += line.quantity;
        sums.txval += line.taxable_amount;
        sums.iamt += line.igst_amount;
        sums.camt += line.cgst_amount;
        sums.samt += line.sgst_amount;
        sums.csamt += line.cess_amount;
    }
}
