use crate::auth::{Claims, Role};

/// A seeded identity for local development logins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockUser {
    pub id: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub role: Role,
}

pub const MOCK_USERS: &[MockUser] = &[
    MockUser {
        id: "user1",
        name: "Alice Johnson",
        email: "alice@example.com",
        role: Role::User,
    },
    MockUser {
        id: "user2",
        name: "Bob Smith",
        email: "bob@example.com",
        role: Role::User,
    },
    MockUser {
        id: "user3",
        name: "Charlie Davis",
        email: "charlie@example.com",
        role: Role::User,
    },
    MockUser {
        id: "user4",
        name: "Diana Miller",
        email: "diana@example.com",
        role: Role::User,
    },
    MockUser {
        id: "user5",
        name: "Ethan Brown",
        email: "ethan@example.com",
        role: Role::User,
    },
    MockUser {
        id: "admin1",
        name: "Admin Root",
        email: "admin@example.com",
        role: Role::Administrator,
    },
];

/// The identity behind `/api/auth/mock-admin`
pub const MOCK_ADMIN: MockUser = MockUser {
    id: "admin1",
    name: "Mock Admin",
    email: "admin@example.com",
    role: Role::Administrator,
};

pub fn find(id: &str) -> Option<&'static MockUser> {
    MOCK_USERS.iter().find(|u| u.id == id)
}

impl MockUser {
    pub fn claims(&self, expiry_hours: u64) -> Claims {
        Claims::new(self.id, &[self.role], expiry_hours)
            .with_profile(Some(self.name.to_string()), Some(self.email.to_string()), None)
            .with_provider("mock")
    }
}
