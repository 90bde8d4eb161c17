use crate::quantity::money::Money;

#[must_use]
#[derive(Clone, Debug)]
pub struct Account {
    pub number: String,
    pub name: String,
    pub status: String,
    pub address: String,

    /// Positive when the account is in credit, negative when money is owed.
    pub balance: Money,
}

impl Account {
    pub fn is_in_credit(&self) -> bool {
        self.balance.amount >= 0.0
    }
}
