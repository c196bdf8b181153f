/// Cost inputs for a pricing evaluation, in KRW.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CostBreakdown {
    pub development: f64,
    pub translation: f64,
    pub marketing: f64,
}

/// The figures derived from a pricing evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Economics {
    pub total_cost: f64,
    pub platform_cost: f64,
    pub net_revenue: f64,
    pub profit: f64,
    pub margin_percent: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PricingRecord {
    pub costs: CostBreakdown,
    pub platform_fee_percent: f64,
    pub suggested_price: f64,
    pub economics: Economics,
    pub notes: String,
}
