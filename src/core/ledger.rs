use serde::Serialize;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotionalAccountBalances {
    pub cda: f64,
    pub erdtoh: f64,
    pub nrdtoh: f64,
    pub grip: f64,
    pub corporate_investments: f64,
}

impl NotionalAccountBalances {
    pub fn clamped(self) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            cda: clamp(self.cda),
            erdtoh: clamp(self.erdtoh),
            nrdtoh: clamp(self.nrdtoh),
            grip: clamp(self.grip),
            corporate_investments: clamp(self.corporate_investments),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NotionalAccount {
    Cda,
    Erdtoh,
    Nrdtoh,
    Grip,
    CorporateInvestments,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMovement {
    pub start: f64,
    pub added: f64,
    pub used: f64,
    pub end: f64,
}

impl AccountMovement {
    fn opening(balance: f64) -> Self {
        Self {
            start: balance,
            added: 0.0,
            used: 0.0,
            end: balance,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotionalAccountSnapshot {
    pub cda: AccountMovement,
    pub erdtoh: AccountMovement,
    pub nrdtoh: AccountMovement,
    pub grip: AccountMovement,
    pub corporate_investments: AccountMovement,
}

impl NotionalAccountSnapshot {
    pub fn closing(&self) -> NotionalAccountBalances {
        NotionalAccountBalances {
            cda: self.cda.end,
            erdtoh: self.erdtoh.end,
            nrdtoh: self.nrdtoh.end,
            grip: self.grip.end,
            corporate_investments: self.corporate_investments.end,
        }
    }
}

/// One year of account activity. Opened from the prior year's closing
/// balances; every add and draw is recorded against the movement.
#[derive(Clone, Debug)]
pub struct NotionalLedger {
    snapshot: NotionalAccountSnapshot,
}

impl NotionalLedger {
    pub fn open(balances: NotionalAccountBalances) -> Self {
        let b = balances.clamped();
        Self {
            snapshot: NotionalAccountSnapshot {
                cda: AccountMovement::opening(b.cda),
                erdtoh: AccountMovement::opening(b.erdtoh),
                nrdtoh: AccountMovement::opening(b.nrdtoh),
                grip: AccountMovement::opening(b.grip),
                corporate_investments: AccountMovement::opening(b.corporate_investments),
            },
        }
    }

    fn movement_mut(&mut self, account: NotionalAccount) -> &mut AccountMovement {
        match account {
            NotionalAccount::Cda => &mut self.snapshot.cda,
            NotionalAccount::Erdtoh => &mut self.snapshot.erdtoh,
            NotionalAccount::Nrdtoh => &mut self.snapshot.nrdtoh,
            NotionalAccount::Grip => &mut self.snapshot.grip,
            NotionalAccount::CorporateInvestments => &mut self.snapshot.corporate_investments,
        }
    }

    pub fn balances(&self) -> NotionalAccountBalances {
        self.snapshot.closing()
    }

    pub fn add(&mut self, account: NotionalAccount, amount: f64) {
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        let m = self.movement_mut(account);
        m.added += amount;
        m.end += amount;
    }

    pub fn add_all(&mut self, additions: &NotionalAccountBalances) {
        self.add(NotionalAccount::Cda, additions.cda);
        self.add(NotionalAccount::Erdtoh, additions.erdtoh);
        self.add(NotionalAccount::Nrdtoh, additions.nrdtoh);
        self.add(NotionalAccount::Grip, additions.grip);
        self.add(
            NotionalAccount::CorporateInvestments,
            additions.corporate_investments,
        );
    }

    /// Draws up to `amount` and returns what was actually taken.
    pub fn draw(&mut self, account: NotionalAccount, amount: f64) -> f64 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let m = self.movement_mut(account);
        let taken = amount.min(m.end);
        m.used += taken;
        m.end = (m.end - taken).max(0.0);
        taken
    }

    pub fn draw_all(&mut self, draws: &NotionalAccountBalances) {
        self.draw(NotionalAccount::Cda, draws.cda);
        self.draw(NotionalAccount::Erdtoh, draws.erdtoh);
        self.draw(NotionalAccount::Nrdtoh, draws.nrdtoh);
        self.draw(NotionalAccount::Grip, draws.grip);
        self.draw(
            NotionalAccount::CorporateInvestments,
            draws.corporate_investments,
        );
    }

    pub fn snapshot(&self) -> NotionalAccountSnapshot {
        self.snapshot
    }
}
