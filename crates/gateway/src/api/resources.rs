//! `GET /v1/resources`: fixed directory of crisis lines and organizations
//! in Bangladesh.

use axum::response::Json;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CrisisContact {
    pub name: &'static str,
    pub contact: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Organization {
    pub name: &'static str,
    pub website: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Directory {
    pub crisis_resources: &'static [CrisisContact],
    pub organizations: &'static [Organization],
}

const CRISIS_CONTACTS: &[CrisisContact] = &[
    CrisisContact {
        name: "National Mental Health Helpline (Bangladesh)",
        contact: "01688-709965, 01688-709966",
        description: "Government helpline for mental health support",
    },
    CrisisContact {
        name: "Kaan Pete Roi (Emotional Support)",
        contact: "9612119911",
        description: "Emotional support and suicide prevention hotline",
    },
    CrisisContact {
        name: "Bangladesh Emergency Services",
        contact: "999",
        description: "National emergency services",
    },
];

const ORGANIZATIONS: &[Organization] = &[
    Organization {
        name: "National Institute of Mental Health (NIMH)",
        website: "https://nimhbd.com/",
        description: "Leading mental health institution in Bangladesh",
    },
    Organization {
        name: "Bangladesh Association of Psychiatrists",
        website: "http://www.bap.org.bd/",
        description: "Professional association of psychiatrists",
    },
    Organization {
        name: "Dhaka Community Hospital",
        website: "http://dchtrust.org/",
        description: "Hospital providing mental health services",
    },
    Organization {
        name: "Mental Health & Psychosocial Support Network Bangladesh",
        website: "https://www.mhinnovation.net/organisations/mental-health-psychosocial-support-network-bangladesh",
        description: "Network providing psychosocial support",
    },
];

pub const DIRECTORY: Directory = Directory {
    crisis_resources: CRISIS_CONTACTS,
    organizations: ORGANIZATIONS,
};

pub async fn list_resources() -> Json<Directory> {
    Json(DIRECTORY)
}
