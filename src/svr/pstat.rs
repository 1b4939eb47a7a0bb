use serde::Serialize;
use uuid::Uuid;

/// Device provisioning mode bits (`cm`, `tm`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Dpm(pub u16);

impl Dpm {
    pub const NORMAL: u16 = 0x00;
    pub const RESET: u16 = 0x01;
    pub const TAKE_OWNER: u16 = 0x02;
    pub const BOOTSTRAP_SERVICE: u16 = 0x04;
    pub const SECURITY_MANAGEMENT_SERVICES: u16 = 0x08;
    pub const PROVISION_CREDENTIALS: u16 = 0x10;
    pub const PROVISION_ACLS: u16 = 0x20;

    const NAMED: [(u16, &'static str); 6] = [
        (Self::RESET, "RESET"),
        (Self::TAKE_OWNER, "TAKE_OWNER"),
        (Self::BOOTSTRAP_SERVICE, "BOOTSTRAP_SERVICE"),
        (Self::SECURITY_MANAGEMENT_SERVICES, "SECURITY_MANAGEMENT_SERVICES"),
        (Self::PROVISION_CREDENTIALS, "PROVISION_CREDENTIALS"),
        (Self::PROVISION_ACLS, "PROVISION_ACLS"),
    ];

    pub fn names(self) -> Vec<&'static str> {
        if self.0 == Self::NORMAL {
            return vec!["NORMAL"];
        }
        Self::NAMED
            .iter()
            .filter(|(bit, _)| self.0 & bit != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

/// Device provisioning operation mode bits (`om`, `sm`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Dpom(pub u16);

impl Dpom {
    pub const MULTIPLE_SERVICE_SERVER_DRIVEN: u16 = 0x01;
    pub const SINGLE_SERVICE_SERVER_DRIVEN: u16 = 0x02;
    pub const SINGLE_SERVICE_CLIENT_DRIVEN: u16 = 0x04;

    pub fn names(self) -> Vec<&'static str> {
        [
            (Self::MULTIPLE_SERVICE_SERVER_DRIVEN, "MULTIPLE_SERVICE_SERVER_DRIVEN"),
            (Self::SINGLE_SERVICE_SERVER_DRIVEN, "SINGLE_SERVICE_SERVER_DRIVEN"),
            (Self::SINGLE_SERVICE_CLIENT_DRIVEN, "SINGLE_SERVICE_CLIENT_DRIVEN"),
        ]
        .into_iter()
        .filter(|(bit, _)| self.0 & bit != 0)
        .map(|(_, name)| name)
        .collect()
    }
}

/// Provisioning status, replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Pstat {
    pub is_op: bool,
    pub cm: Dpm,
    pub tm: Dpm,
    pub om: Dpom,
    pub sm: Vec<Dpom>,
    pub rowner: Uuid,
}
