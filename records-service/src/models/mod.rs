use std::fmt;

/// The two externally owned collections this service reads and patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Payroll,
    Shipping,
}

impl RecordKind {
    /// Dotted path of the identifier a request addresses.
    pub fn id_path(self) -> &'static str {
        match self {
            RecordKind::Payroll => "data.payrollRecords.crewMemberId",
            RecordKind::Shipping => "shippingPerson.id",
        }
    }

    /// Path written by an update of `field`. Payroll targets the matched element of
    /// `data.payrollRecords` through the positional operator.
    pub fn update_path(self, field: &str) -> String {
        match self {
            RecordKind::Payroll => format!("data.payrollRecords.$.{}", field),
            RecordKind::Shipping => format!("shippingPerson.{}", field),
        }
    }

    /// Request body key carrying the identifier.
    pub fn id_key(self) -> &'static str {
        match self {
            RecordKind::Payroll => "crewMemberId",
            RecordKind::Shipping => "shippingId",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Payroll => "payroll",
            RecordKind::Shipping => "shipping",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts reported by a single-document update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payroll_updates_use_positional_element() {
        assert_eq!(
            RecordKind::Payroll.update_path("address.city"),
            "data.payrollRecords.$.address.city"
        );
    }

    #[test]
    fn shipping_updates_nest_under_person() {
        assert_eq!(RecordKind::Shipping.update_path("address"), "shippingPerson.address");
        assert_eq!(RecordKind::Shipping.id_path(), "shippingPerson.id");
    }
}
