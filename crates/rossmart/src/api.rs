//!
//! Resource operations of the PAYE Employers API
//!
//! Thin wrappers that format the resource paths and payload envelopes and
//! delegate to the signed dispatcher. Payload shapes are passed through
//! verbatim; the server documentation is the authority on field names.
//!
//! <https://revenue-ie.github.io/paye-employers-documentation/rest/paye-employers-rest-api.html>
//!

use crate::{client::Client, error::Result};
use serde_json::{json, Value};
use uuid::Uuid;

impl Client {
    /// Connection test verifying credentials, keys and signing end to end
    pub async fn handshake(&self) -> Result<Value> {
        self.get(
            "/handshake",
            &[(
                "employerRegistrationNumber",
                self.employer_registration_number(),
            )],
        )
        .await
    }

    /// Current status of a payroll run
    pub async fn check_payroll_run_complete(&self, payroll_run_reference: &str) -> Result<Value> {
        let path = format!(
            "/payroll/{}/{}/{payroll_run_reference}",
            self.employer_registration_number(),
            self.tax_year(),
        );

        self.get(&path, &[]).await
    }

    /// Current status of a payroll submission
    pub async fn check_payroll_submission(
        &self,
        payroll_run_reference: &str,
        submission_id: &str,
    ) -> Result<Value> {
        let path = format!(
            "/payroll/{}/{}/{payroll_run_reference}/{submission_id}",
            self.employer_registration_number(),
            self.tax_year(),
        );

        self.get(&path, &[]).await
    }

    /// Submit payslips for a payroll run
    pub async fn create_payroll_submission(
        &self,
        payroll_run_reference: &str,
        submission_id: &str,
        payslips: Value,
        line_item_ids_to_delete: Option<Value>,
    ) -> Result<Value> {
        let mut payload = json!({ "payslips": payslips });
        if let Some(line_item_ids) = line_item_ids_to_delete {
            payload["lineItemIDsToDelete"] = line_item_ids;
        }

        let path = format!(
            "/payroll/{}/{}/{payroll_run_reference}/{submission_id}",
            self.employer_registration_number(),
            self.tax_year(),
        );

        self.post(&path, &[], &payload).await
    }

    /// Look up the RPN for a single employee
    ///
    /// `employee_id` is the concatenation of the employee's PPSN and
    /// employment id, for example `7009613EA-0`.
    pub async fn lookup_rpn_by_employee(&self, employee_id: &str) -> Result<Value> {
        let path = format!(
            "/rpn/{}/{}/{employee_id}",
            self.employer_registration_number(),
            self.tax_year(),
        );

        self.get(&path, &[]).await
    }

    /// Look up RPNs for all, or a selection of, the employer's employees
    pub async fn lookup_rpn_by_employer(
        &self,
        date_last_updated: Option<&str>,
        employee_ids: &[&str],
    ) -> Result<Value> {
        let path = format!(
            "/rpn/{}/{}",
            self.employer_registration_number(),
            self.tax_year(),
        );

        let mut query = Vec::new();
        if let Some(date_last_updated) = date_last_updated {
            query.push(("dateLastUpdated", date_last_updated));
        }
        for employee_id in employee_ids {
            query.push(("employeeIDs", *employee_id));
        }

        self.get(&path, &query).await
    }

    /// Create a temporary RPN for a new employee
    ///
    /// A `requestId` is generated when none is supplied.
    pub async fn create_temporary_rpn(
        &self,
        employee_id: Value,
        name: Value,
        employment_start_date: Option<&str>,
        request_id: Option<&str>,
    ) -> Result<Value> {
        let request_id = request_id.map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

        let mut new_employee = json!({
            "employeeID": employee_id,
            "name": name,
        });
        if let Some(employment_start_date) = employment_start_date {
            new_employee["employmentStartDate"] = json!(employment_start_date);
        }

        let payload = json!({
            "requestId": request_id,
            "newEmployeeDetails": [new_employee],
        });

        let path = format!(
            "/rpn/{}/{}",
            self.employer_registration_number(),
            self.tax_year(),
        );

        self.post(&path, &[], &payload).await
    }

    /// Look up payroll returns inside a reporting period
    pub async fn lookup_payroll_return_by_period(
        &self,
        period_start_date: &str,
        period_end_date: &str,
    ) -> Result<Value> {
        let path = format!(
            "/returns_reconciliation/{}",
            self.employer_registration_number(),
        );

        self.get(
            &path,
            &[
                ("periodStartDate", period_start_date),
                ("periodEndDate", period_end_date),
            ],
        )
        .await
    }
}
