use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::{EmployeeDirectory, LeaveStore, StoreError};
use crate::model::employee::{Employee, NewEmployee};
use crate::model::leave::{LeaveRecord, ValidatedLeave};

#[derive(Default)]
struct State {
    employees: BTreeMap<u64, Employee>,
    leaves: BTreeMap<u64, LeaveRecord>,
    last_employee_id: u64,
    last_leave_id: u64,
}

/// Process-local backend implementing both store traits.
///
/// Mirrors the MySQL schema rules: ids are never reused, a leave must
/// reference an existing employee and deleting an employee cascades.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }
}

fn dangling(employee_id: u64) -> StoreError {
    StoreError::Constraint(format!("employee {employee_id} does not exist"))
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn insert(&self, leave: &ValidatedLeave) -> Result<u64, StoreError> {
        let mut state = self.write()?;
        if !state.employees.contains_key(&leave.employee_id) {
            return Err(dangling(leave.employee_id));
        }
        state.last_leave_id += 1;
        let id = state.last_leave_id;
        state.leaves.insert(id, LeaveRecord::from_validated(id, *leave));
        Ok(id)
    }

    async fn update(&self, id: u64, leave: &ValidatedLeave) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        if !state.leaves.contains_key(&id) {
            return Ok(false);
        }
        if !state.employees.contains_key(&leave.employee_id) {
            return Err(dangling(leave.employee_id));
        }
        state.leaves.insert(id, LeaveRecord::from_validated(id, *leave));
        Ok(true)
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        Ok(self.write()?.leaves.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<LeaveRecord>, StoreError> {
        Ok(self.read()?.leaves.get(&id).copied())
    }

    async fn find_all_by_employee(&self, employee_id: u64) -> Result<Vec<LeaveRecord>, StoreError> {
        Ok(self
            .read()?
            .leaves
            .values()
            .filter(|l| l.employee_id == employee_id)
            .copied()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<LeaveRecord>, StoreError> {
        Ok(self.read()?.leaves.values().copied().collect())
    }

    async fn find_page(
        &self,
        employee_id: Option<u64>,
        limit: u32,
        offset: u64,
    ) -> Result<(Vec<LeaveRecord>, u64), StoreError> {
        let state = self.read()?;
        let matching: Vec<LeaveRecord> = state
            .leaves
            .values()
            .filter(|l| employee_id.is_none_or(|id| l.employee_id == id))
            .copied()
            .collect();
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn list_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read()?
            .employees
            .values()
            .map(Employee::display_name)
            .collect())
    }

    async fn resolve_id(&self, name: &str) -> Result<Option<u64>, StoreError> {
        Ok(self
            .read()?
            .employees
            .values()
            .find(|e| e.display_name() == name)
            .map(|e| e.id))
    }

    async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self.read()?.employees.values().cloned().collect())
    }

    async fn get(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        Ok(self.read()?.employees.get(&id).cloned())
    }

    async fn create(&self, employee: &NewEmployee) -> Result<Employee, StoreError> {
        let mut state = self.write()?;
        state.last_employee_id += 1;
        let created = Employee {
            id: state.last_employee_id,
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.clone(),
            phone: employee.phone.clone(),
        };
        state.employees.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: u64, employee: &NewEmployee) -> Result<Option<Employee>, StoreError> {
        let mut state = self.write()?;
        let Some(existing) = state.employees.get_mut(&id) else {
            return Ok(None);
        };
        existing.first_name = employee.first_name.clone();
        existing.last_name = employee.last_name.clone();
        existing.email = employee.email.clone();
        existing.phone = employee.phone.clone();
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        if state.employees.remove(&id).is_none() {
            return Ok(false);
        }
        state.leaves.retain(|_, l| l.employee_id != id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave::{DateSpan, LeaveType};

    fn new_employee(first: &str, last: &str) -> NewEmployee {
        NewEmployee {
            first_name: first.into(),
            last_name: last.into(),
            email: format!("{first}@corp.example"),
            phone: None,
        }
    }

    fn leave(employee_id: u64, start: &str, end: &str) -> ValidatedLeave {
        ValidatedLeave {
            employee_id,
            span: DateSpan::new(start.parse().unwrap(), end.parse().unwrap()).unwrap(),
            leave_type: LeaveType::Paid,
        }
    }

    #[actix_web::test]
    async fn ids_are_never_reused() {
        let store = MemoryStore::new();
        let emp = store.create(&new_employee("Ada", "Lovelace")).await.unwrap();

        let first = store.insert(&leave(emp.id, "2024-01-01", "2024-01-02")).await.unwrap();
        assert!(LeaveStore::delete(&store, first).await.unwrap());
        let second = store.insert(&leave(emp.id, "2024-01-01", "2024-01-02")).await.unwrap();
        assert!(second > first);
    }

    #[actix_web::test]
    async fn insert_rejects_dangling_employee() {
        let store = MemoryStore::new();
        let err = store
            .insert(&leave(42, "2024-01-01", "2024-01-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn resolve_id_prefers_lowest_id_on_duplicate_names() {
        let store = MemoryStore::new();
        let first = store.create(&new_employee("Sam", "Lee")).await.unwrap();
        store.create(&new_employee("Sam", "Lee")).await.unwrap();

        assert_eq!(store.resolve_id("Sam Lee").await.unwrap(), Some(first.id));
        assert_eq!(store.resolve_id("sam lee").await.unwrap(), None);
        assert_eq!(
            store.list_names().await.unwrap(),
            vec!["Sam Lee".to_string(), "Sam Lee".to_string()]
        );
    }

    #[actix_web::test]
    async fn deleting_employee_cascades_to_leave() {
        let store = MemoryStore::new();
        let ada = store.create(&new_employee("Ada", "Lovelace")).await.unwrap();
        let bob = store.create(&new_employee("Bob", "Smith")).await.unwrap();
        store.insert(&leave(ada.id, "2024-01-01", "2024-01-02")).await.unwrap();
        store.insert(&leave(bob.id, "2024-01-01", "2024-01-02")).await.unwrap();

        assert!(EmployeeDirectory::delete(&store, ada.id).await.unwrap());

        let remaining = store.find_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].employee_id, bob.id);
        assert!(!EmployeeDirectory::delete(&store, ada.id).await.unwrap());
    }

    #[actix_web::test]
    async fn update_reports_missing_rows() {
        let store = MemoryStore::new();
        let ada = store.create(&new_employee("Ada", "Lovelace")).await.unwrap();
        let missing = LeaveStore::update(&store, 5, &leave(ada.id, "2024-01-01", "2024-01-02"))
            .await
            .unwrap();
        assert!(!missing);
        let missing = EmployeeDirectory::update(&store, 9, &new_employee("X", "Y"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[actix_web::test]
    async fn find_page_filters_counts_and_windows() {
        let store = MemoryStore::new();
        let ada = store.create(&new_employee("Ada", "Lovelace")).await.unwrap();
        let bob = store.create(&new_employee("Bob", "Smith")).await.unwrap();
        for (emp, start, end) in [
            (ada.id, "2024-01-01", "2024-01-02"),
            (bob.id, "2024-01-01", "2024-01-02"),
            (ada.id, "2024-02-01", "2024-02-02"),
            (ada.id, "2024-03-01", "2024-03-02"),
        ] {
            store.insert(&leave(emp, start, end)).await.unwrap();
        }

        let (page, total) = store.find_page(Some(ada.id), 2, 2).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].span.start, "2024-03-01".parse::<chrono::NaiveDate>().unwrap());

        let (page, total) = store.find_page(None, 10, 0).await.unwrap();
        assert_eq!(total, 4);
        assert!(page.windows(2).all(|w| w[0].id < w[1].id));
    }
}
