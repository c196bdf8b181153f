use crate::models::{
    CostBreakdown, Economics, PricingRecord, Submission, SubmissionStatus,
};

use super::{transition::advance, PipelineError, StagePayload};

/// Derives the economics of a suggested price.
///
/// All monetary inputs must be finite and non-negative and the platform fee
/// must be a percentage; anything else is an `InvalidInput` naming the field.
pub fn compute_economics(
    costs: &CostBreakdown,
    suggested_price: f64,
    platform_fee_percent: f64,
) -> Result<Economics, PipelineError> {
    ensure_money("development cost", costs.development)?;
    ensure_money("translation cost", costs.translation)?;
    ensure_money("marketing cost", costs.marketing)?;
    ensure_money("suggested price", suggested_price)?;

    if !platform_fee_percent.is_finite() || !(0.0..=100.0).contains(&platform_fee_percent) {
        return Err(PipelineError::InvalidInput {
            field: "platform fee percent",
        });
    }

    let total_cost = costs.development + costs.translation + costs.marketing;
    let platform_cost = suggested_price * platform_fee_percent / 100.0;
    let net_revenue = suggested_price - platform_cost;
    let profit = net_revenue - total_cost;
    let margin_percent = if net_revenue > 0.0 {
        profit / net_revenue * 100.0
    } else {
        0.0
    };

    Ok(Economics {
        total_cost,
        platform_cost,
        net_revenue,
        profit,
        margin_percent,
    })
}

/// Validates the pricing inputs and bundles them with their economics.
pub fn build_pricing_record(
    costs: CostBreakdown,
    suggested_price: f64,
    platform_fee_percent: f64,
    notes: &str,
) -> Result<PricingRecord, PipelineError> {
    let economics = compute_economics(&costs, suggested_price, platform_fee_percent)?;

    Ok(PricingRecord {
        costs,
        platform_fee_percent,
        suggested_price,
        economics,
        notes: notes.to_string(),
    })
}

/// Attaches a pricing evaluation and advances the submission to
/// `PricingCompleted`.
pub fn save_pricing(
    submission: &Submission,
    costs: CostBreakdown,
    suggested_price: f64,
    platform_fee_percent: f64,
    notes: &str,
) -> Result<Submission, PipelineError> {
    let record = build_pricing_record(costs, suggested_price, platform_fee_percent, notes)?;

    advance(
        submission,
        SubmissionStatus::PricingCompleted,
        StagePayload::Pricing { record },
    )
}

pub(super) fn ensure_money(field: &'static str, value: f64) -> Result<(), PipelineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PipelineError::InvalidInput { field });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        fixtures,
        models::{CostBreakdown, SubmissionStatus},
        pipeline::{compute_economics, save_pricing, PipelineError},
    };

    fn reference_costs() -> CostBreakdown {
        CostBreakdown {
            development: 500_000.0,
            translation: 200_000.0,
            marketing: 300_000.0,
        }
    }

    #[test]
    fn reference_evaluation() {
        let economics = compute_economics(&reference_costs(), 15_000.0, 30.0).unwrap();

        assert_eq!(economics.total_cost, 1_000_000.0);
        assert_eq!(economics.platform_cost, 4_500.0);
        assert_eq!(economics.net_revenue, 10_500.0);
        assert_eq!(economics.profit, -989_500.0);
        assert!((economics.margin_percent - -9_423.809_523_809_523).abs() < 1e-9);
    }

    #[test]
    fn margin_is_zero_without_net_revenue() {
        let economics = compute_economics(&reference_costs(), 0.0, 0.0).unwrap();
        assert_eq!(economics.net_revenue, 0.0);
        assert_eq!(economics.margin_percent, 0.0);

        let all_fee = compute_economics(&reference_costs(), 15_000.0, 100.0).unwrap();
        assert_eq!(all_fee.net_revenue, 0.0);
        assert_eq!(all_fee.margin_percent, 0.0);
    }

    #[test]
    fn negative_costs_are_rejected() {
        let costs = CostBreakdown {
            development: -1.0,
            ..reference_costs()
        };

        assert_eq!(
            compute_economics(&costs, 15_000.0, 30.0),
            Err(PipelineError::InvalidInput {
                field: "development cost"
            })
        );
    }

    #[test]
    fn the_fee_must_be_a_percentage() {
        for fee in [-0.1, 100.1, f64::NAN, f64::INFINITY] {
            assert_eq!(
                compute_economics(&reference_costs(), 15_000.0, fee),
                Err(PipelineError::InvalidInput {
                    field: "platform fee percent"
                })
            );
        }
    }

    #[test]
    fn non_finite_prices_are_rejected() {
        for price in [f64::NAN, f64::INFINITY, -15_000.0] {
            assert_eq!(
                compute_economics(&reference_costs(), price, 30.0),
                Err(PipelineError::InvalidInput {
                    field: "suggested price"
                })
            );
        }
    }

    #[test]
    fn saving_attaches_the_record_and_advances() {
        let submission = fixtures::submission_at(SubmissionStatus::TranslationApproved);

        let priced = save_pricing(
            &submission,
            reference_costs(),
            15_000.0,
            30.0,
            "Aggressive launch price for overseas markets",
        )
        .unwrap();

        assert_eq!(priced.status, SubmissionStatus::PricingCompleted);
        let record = priced.pricing.unwrap();
        assert_eq!(record.suggested_price, 15_000.0);
        assert_eq!(record.economics.total_cost, 1_000_000.0);
    }

    #[test]
    fn pricing_requires_the_pricing_stage() {
        let submission = fixtures::submission_at(SubmissionStatus::DeveloperAssigned);

        assert!(matches!(
            save_pricing(&submission, reference_costs(), 15_000.0, 30.0, ""),
            Err(PipelineError::InvalidTransition { .. })
        ));
    }
}
