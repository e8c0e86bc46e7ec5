//! Account commands.

use common::{AggregateId, CommandId};
use event_store::Version;

use crate::command::{Command, HandleCommand};

use super::{Account, Money};

/// Command to open a new account.
///
/// Always a create: carries version 0 so no history is loaded.
#[derive(Debug, Clone)]
pub struct OpenAccount {
    /// The account identity to establish.
    pub account_id: AggregateId,

    /// Unique command id.
    pub command_id: CommandId,

    /// Name of the account owner.
    pub owner: String,
}

impl OpenAccount {
    /// Creates a new OpenAccount command.
    pub fn new(account_id: AggregateId, owner: impl Into<String>) -> Self {
        Self {
            account_id,
            command_id: CommandId::new(),
            owner: owner.into(),
        }
    }

    /// Creates a new OpenAccount command with a generated account id.
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self::new(AggregateId::new(), owner)
    }
}

impl Command for OpenAccount {
    type Aggregate = Account;

    fn aggregate_id(&self) -> AggregateId {
        self.account_id
    }

    fn command_id(&self) -> CommandId {
        self.command_id
    }

    fn expected_version(&self) -> Version {
        Version::initial()
    }
}

impl HandleCommand<OpenAccount> for Account {
    fn handle_command(&mut self, command: &OpenAccount) -> Result<(), Self::Error> {
        self.open(command.account_id, command.owner.clone())
    }
}

/// Command to deposit money into an account.
#[derive(Debug, Clone)]
pub struct DepositMoney {
    /// The target account.
    pub account_id: AggregateId,

    /// Unique command id.
    pub command_id: CommandId,

    /// The account version the caller last observed.
    pub expected_version: Version,

    /// Amount to deposit.
    pub amount: Money,
}

impl DepositMoney {
    /// Creates a new DepositMoney command.
    pub fn new(account_id: AggregateId, expected_version: Version, amount: Money) -> Self {
        Self {
            account_id,
            command_id: CommandId::new(),
            expected_version,
            amount,
        }
    }
}

impl Command for DepositMoney {
    type Aggregate = Account;

    fn aggregate_id(&self) -> AggregateId {
        self.account_id
    }

    fn command_id(&self) -> CommandId {
        self.command_id
    }

    fn expected_version(&self) -> Version {
        self.expected_version
    }
}

impl HandleCommand<DepositMoney> for Account {
    fn handle_command(&mut self, command: &DepositMoney) -> Result<(), Self::Error> {
        self.deposit(command.amount)
    }
}

/// Command to withdraw money from an account.
#[derive(Debug, Clone)]
pub struct WithdrawMoney {
    /// The target account.
    pub account_id: AggregateId,

    /// Unique command id.
    pub command_id: CommandId,

    /// The account version the caller last observed.
    pub expected_version: Version,

    /// Amount to withdraw.
    pub amount: Money,
}

impl WithdrawMoney {
    /// Creates a new WithdrawMoney command.
    pub fn new(account_id: AggregateId, expected_version: Version, amount: Money) -> Self {
        Self {
            account_id,
            command_id: CommandId::new(),
            expected_version,
            amount,
        }
    }
}

impl Command for WithdrawMoney {
    type Aggregate = Account;

    fn aggregate_id(&self) -> AggregateId {
        self.account_id
    }

    fn command_id(&self) -> CommandId {
        self.command_id
    }

    fn expected_version(&self) -> Version {
        self.expected_version
    }
}

impl HandleCommand<WithdrawMoney> for Account {
    fn handle_command(&mut self, command: &WithdrawMoney) -> Result<(), Self::Error> {
        self.withdraw(command.amount)
    }
}

/// Command to close an emptied account.
#[derive(Debug, Clone)]
pub struct CloseAccount {
    /// The target account.
    pub account_id: AggregateId,

    /// Unique command id.
    pub command_id: CommandId,

    /// The account version the caller last observed.
    pub expected_version: Version,
}

impl CloseAccount {
    /// Creates a new CloseAccount command.
    pub fn new(account_id: AggregateId, expected_version: Version) -> Self {
        Self {
            account_id,
            command_id: CommandId::new(),
            expected_version,
        }
    }
}

impl Command for CloseAccount {
    type Aggregate = Account;

    fn aggregate_id(&self) -> AggregateId {
        self.account_id
    }

    fn command_id(&self) -> CommandId {
        self.command_id
    }

    fn expected_version(&self) -> Version {
        self.expected_version
    }
}

impl HandleCommand<CloseAccount> for Account {
    fn handle_command(&mut self, _command: &CloseAccount) -> Result<(), Self::Error> {
        self.close()
    }
}
