//! Static catalogue of the product's feature areas and how far along each is.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleStatus {
    Todo,
    InProgress,
    Completed,
}

impl ModuleStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TODO" => Some(ModuleStatus::Todo),
            "IN_PROGRESS" => Some(ModuleStatus::InProgress),
            "COMPLETED" => Some(ModuleStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub status: ModuleStatus,
    pub progress: u8,
    pub path: &'static str,
    pub entities: &'static [&'static str],
    pub features: &'static [&'static str],
}

pub static MODULES: [ModuleInfo; 8] = [
    ModuleInfo {
        id: "attendance-management",
        name: "Attendance Management",
        description: "Digital attendance tracking, leave requests, parent notifications",
        status: ModuleStatus::InProgress,
        progress: 15,
        path: "/modules/attendance-management",
        entities: &["Student", "Attendance", "LeaveRequest", "Parent"],
        features: &["Real-time tracking", "Leave management", "Parent notifications", "Reporting"],
    },
    ModuleInfo {
        id: "financial-accounting",
        name: "Financial Accounting",
        description: "Ledger, transactions, reports, centralized cloud-based accounting",
        status: ModuleStatus::Todo,
        progress: 0,
        path: "/modules/financial-accounting",
        entities: &["Account", "Transaction", "Report"],
        features: &["Double-entry bookkeeping", "Financial reports", "Bank reconciliation", "Audit trail"],
    },
    ModuleInfo {
        id: "fee-management",
        name: "Fee Management",
        description: "Online fee collection, alerts, defaulter tracking",
        status: ModuleStatus::Todo,
        progress: 0,
        path: "/modules/fee-management",
        entities: &["FeeStructure", "Invoice", "Payment", "Alert"],
        features: &["Online payments", "Invoice generation", "Automated reminders", "Defaulter tracking"],
    },
    ModuleInfo {
        id: "library-management",
        name: "Library Management",
        description: "Cataloging, issue/return, fines, availability tracking",
        status: ModuleStatus::Todo,
        progress: 0,
        path: "/modules/library-management",
        entities: &["LibraryItem", "IssueRecord", "Fine", "Student"],
        features: &["Digital catalog", "Issue/return system", "Fine management", "Search & discovery"],
    },
    ModuleInfo {
        id: "exam-result-management",
        name: "Exam & Result Management",
        description: "Exam scheduling, grading, report cards, progress tracking",
        status: ModuleStatus::Todo,
        progress: 0,
        path: "/modules/exam-result-management",
        entities: &["Exam", "Result", "ReportCard", "Student", "Subject"],
        features: &["Exam scheduling", "Grading system", "Report generation", "Performance analytics"],
    },
    ModuleInfo {
        id: "student-information-system",
        name: "Student Information System",
        description: "Centralized student profiles, homework workflow, academic tracking",
        status: ModuleStatus::InProgress,
        progress: 35,
        path: "/modules/student-information-system",
        entities: &["Student", "Guardian", "Homework", "Grade", "Timetable"],
        features: &[
            "Profile management",
            "Homework workflow",
            "Grade tracking",
            "Timetable management",
            "Parent communication",
        ],
    },
    ModuleInfo {
        id: "bus-transport-gps",
        name: "Bus Transport & GPS",
        description: "Route planning, GPS tracking, driver logs, vehicle management",
        status: ModuleStatus::Todo,
        progress: 0,
        path: "/modules/bus-transport-gps",
        entities: &["Bus", "Route", "Stop", "Driver", "GPSLocation", "Incident"],
        features: &["Fleet management", "Route planning", "Real-time tracking", "Safety management"],
    },
    ModuleInfo {
        id: "online-registration",
        name: "Online Registration",
        description: "Remote student registration, verification workflows",
        status: ModuleStatus::Todo,
        progress: 0,
        path: "/modules/online-registration",
        entities: &["Registration", "Verification", "Student"],
        features: &["Online application", "Document verification", "Workflow management", "Status tracking"],
    },
];

pub fn get_module_by_id(id: &str) -> Option<&'static ModuleInfo> {
    MODULES.iter().find(|m| m.id == id)
}

pub fn modules_by_status(status: ModuleStatus) -> Vec<&'static ModuleInfo> {
    MODULES.iter().filter(|m| m.status == status).collect()
}

/// Mean progress across every module.
pub fn total_progress() -> f64 {
    let sum: u32 = MODULES.iter().map(|m| u32::from(m.progress)).sum();
    f64::from(sum) / MODULES.len() as f64
}
