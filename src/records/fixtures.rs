use serde_json::{Value, json};

use crate::{models::snapshot::Snapshot, records::Record};

fn records(values: Value) -> Vec<Record> {
    match values {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            })
            .collect(),
        _ => vec![],
    }
}

/// Static sample data a fresh store starts from
pub fn seed() -> Snapshot {
    let users = records(json!([
        {"Id": 1, "name": "Alex Johnson", "email": "alex@example.com", "avatar": null, "role": "Project Manager"},
        {"Id": 2, "name": "Sam Rivera", "email": "sam@example.com", "avatar": null, "role": "Backend Developer"},
        {"Id": 3, "name": "Priya Patel", "email": "priya@example.com", "avatar": null, "role": "Designer"},
        {"Id": 4, "name": "Jordan Lee", "email": "jordan@example.com", "avatar": null, "role": "QA Engineer"}
    ]));

    let projects = records(json!([
        {
            "Id": 5, "title": "Website Redesign", "description": "Refresh the marketing site",
            "status": "Active", "deadline": "2026-11-20", "completionPercentage": 25,
            "createdAt": "2026-09-01T09:00:00Z", "updatedAt": "2026-10-01T09:00:00Z",
            "attachments": [{"name": "brief.pdf", "size": 48213, "type": "application/pdf"}]
        },
        {
            "Id": 6, "title": "Mobile App", "description": "First release of the companion app",
            "status": "Planning", "deadline": "2026-12-15", "completionPercentage": 0,
            "createdAt": "2026-09-15T09:00:00Z", "updatedAt": "2026-09-15T09:00:00Z",
            "attachments": []
        },
        {
            "Id": 7, "title": "Billing Migration", "description": "Move invoices to the new provider",
            "status": "Completed", "deadline": "2026-10-05", "completionPercentage": 100,
            "createdAt": "2026-08-01T09:00:00Z", "updatedAt": "2026-10-04T17:00:00Z",
            "attachments": []
        }
    ]));

    let tasks = records(json!([
        {
            "Id": 8, "title": "Audit current pages", "description": "List pages to keep, merge or drop",
            "status": "Done", "priority": "Medium", "dueDate": "2026-10-02", "projectId": 5, "assigneeId": 1,
            "tags": ["content"], "createdAt": "2026-09-02T09:00:00Z", "updatedAt": "2026-10-02T15:00:00Z"
        },
        {
            "Id": 9, "title": "Homepage wireframes", "description": "Low fidelity layouts for review",
            "status": "Review", "priority": "High", "dueDate": "2026-10-14", "projectId": 5, "assigneeId": 3,
            "tags": ["design", "ux"], "createdAt": "2026-09-05T09:00:00Z", "updatedAt": "2026-10-12T11:00:00Z"
        },
        {
            "Id": 10, "title": "Set up CMS", "description": "Provision the headless CMS",
            "status": "In Progress", "priority": "High", "dueDate": "2026-10-22", "projectId": 5, "assigneeId": 2,
            "tags": ["backend"], "createdAt": "2026-09-10T09:00:00Z", "updatedAt": "2026-10-13T10:00:00Z"
        },
        {
            "Id": 11, "title": "Write launch checklist", "description": "",
            "status": "To Do", "priority": "Low", "dueDate": "2026-11-18", "projectId": 5, "assigneeId": 1,
            "tags": [], "createdAt": "2026-09-12T09:00:00Z", "updatedAt": "2026-09-12T09:00:00Z"
        },
        {
            "Id": 12, "title": "Define app navigation", "description": "Tab layout and deep links",
            "status": "To Do", "priority": "Medium", "dueDate": "2026-10-28", "projectId": 6, "assigneeId": 3,
            "tags": ["design"], "createdAt": "2026-09-16T09:00:00Z", "updatedAt": "2026-09-16T09:00:00Z"
        },
        {
            "Id": 13, "title": "Auth API", "description": "Token endpoints for the app",
            "status": "In Progress", "priority": "Critical", "dueDate": "2026-10-09", "projectId": 6, "assigneeId": 1,
            "tags": ["backend", "api"], "createdAt": "2026-09-18T09:00:00Z", "updatedAt": "2026-10-10T16:00:00Z"
        },
        {
            "Id": 14, "title": "Export legacy invoices", "description": "",
            "status": "Done", "priority": "High", "dueDate": "2026-09-20", "projectId": 7, "assigneeId": 2,
            "tags": ["data"], "createdAt": "2026-08-02T09:00:00Z", "updatedAt": "2026-09-19T12:00:00Z"
        },
        {
            "Id": 15, "title": "Regression test payments", "description": "Run the payment suite against staging",
            "status": "Done", "priority": "Medium", "dueDate": "2026-10-03", "projectId": 7, "assigneeId": 4,
            "tags": ["qa"], "createdAt": "2026-08-10T09:00:00Z", "updatedAt": "2026-10-03T18:00:00Z"
        }
    ]));

    let comments = records(json!([
        {"Id": 16, "taskId": 9, "userId": 1, "content": "Looks good, one question on the hero section.", "createdAt": "2026-10-12T12:00:00Z"},
        {"Id": 17, "taskId": 9, "userId": 3, "content": "Updated, please take another look.", "createdAt": "2026-10-13T09:30:00Z"},
        {"Id": 18, "taskId": 13, "userId": 2, "content": "Refresh tokens still pending.", "createdAt": "2026-10-10T16:30:00Z"}
    ]));

    Snapshot {
        last_id: 18,
        projects,
        tasks,
        users,
        comments,
        ..Snapshot::default()
    }
}
