//! Order lifecycle states.

use serde::{Deserialize, Serialize};

/// The state of an order.
///
/// Only two transitions carry logic in this system: `basket → new`
/// (placement, which commits the stock decrement) and `new → canceled`
/// (cancellation, which restores stock). The remaining states are set
/// through administrative edits and have no state-machine logic here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// Transient shopping basket; mutable line items, not yet placed.
    #[default]
    Basket,
    /// Placed order with committed stock decrement.
    New,
    Confirmed,
    Assembled,
    Sent,
    Delivered,
    /// Terminal state; stock has been restored.
    Canceled,
}

impl OrderState {
    /// The state as stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Basket => "basket",
            Self::New => "new",
            Self::Confirmed => "confirmed",
            Self::Assembled => "assembled",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Canceled => "canceled",
        }
    }

    /// Whether an order in this state can be placed.
    #[must_use]
    pub const fn can_place(&self) -> bool {
        matches!(self, Self::Basket)
    }

    /// Whether an order in this state can be canceled by its owner.
    ///
    /// Only freshly placed orders qualify; everything past `new` is in the
    /// hands of the shop.
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        matches!(self, Self::New)
    }

    /// Whether the delivery contact can still be changed.
    #[must_use]
    pub const fn contact_editable(&self) -> bool {
        matches!(self, Self::New)
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basket" => Ok(Self::Basket),
            "new" => Ok(Self::New),
            "confirmed" => Ok(Self::Confirmed),
            "assembled" => Ok(Self::Assembled),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "canceled" => Ok(Self::Canceled),
            _ => Err(format!("invalid order state: {s}")),
        }
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderState {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderState {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse::<Self>()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderState {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}
