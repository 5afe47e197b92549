// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! A fluent builder over [`LogicalPlan`], the construction surface used by
//! both [`crate::frozen::Queryable`] and the expression-tree translator.

use std::sync::Arc;

use arrow_schema::SchemaRef;

use super::{AggregateExpr, AggregateOp, LogicalPlan, SortDirection, SortKey};
use crate::predicate::Predicate;

pub struct LogicalPlanBuilder {
    plan: LogicalPlan,
}

impl LogicalPlanBuilder {
    pub fn scan(schema: SchemaRef, estimated_rows: usize) -> Self {
        Self {
            plan: LogicalPlan::Scan {
                schema,
                estimated_rows,
                projection: None,
                limit: None,
            },
        }
    }

    pub fn from_plan(plan: LogicalPlan) -> Self {
        Self { plan }
    }

    pub fn filter(self, predicates: Vec<Arc<Predicate>>, estimated_selectivity: f64) -> Self {
        Self {
            plan: LogicalPlan::Filter {
                input: Arc::new(self.plan),
                predicates,
                estimated_selectivity,
            },
        }
    }

    pub fn project(self, columns: Vec<usize>) -> Self {
        Self {
            plan: LogicalPlan::Project {
                input: Arc::new(self.plan),
                columns,
            },
        }
    }

    pub fn aggregate(self, op: AggregateOp, column: Option<usize>, output_name: impl Into<String>) -> Self {
        Self {
            plan: LogicalPlan::Aggregate {
                input: Arc::new(self.plan),
                op,
                column,
                output_name: output_name.into(),
                fused_filter: None,
            },
        }
    }

    pub fn group_by(
        self,
        key_column: usize,
        aggregations: Vec<AggregateExpr>,
        result_key_name: impl Into<String>,
    ) -> Self {
        Self {
            plan: LogicalPlan::GroupBy {
                input: Arc::new(self.plan),
                key_column,
                aggregations,
                result_key_name: result_key_name.into(),
            },
        }
    }

    pub fn sort(self, keys: Vec<SortKey>) -> Self {
        Self {
            plan: LogicalPlan::Sort {
                input: Arc::new(self.plan),
                keys,
            },
        }
    }

    pub fn order_by(self, column: usize, descending: bool) -> Self {
        let direction = if descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        self.sort(vec![SortKey { column, direction }])
    }

    pub fn distinct(self, columns: Vec<usize>) -> Self {
        Self {
            plan: LogicalPlan::Distinct {
                input: Arc::new(self.plan),
                columns,
            },
        }
    }

    pub fn limit(self, n: usize) -> Self {
        Self {
            plan: LogicalPlan::Limit {
                input: Arc::new(self.plan),
                n,
            },
        }
    }

    pub fn offset(self, n: usize) -> Self {
        Self {
            plan: LogicalPlan::Offset {
                input: Arc::new(self.plan),
                n,
            },
        }
    }

    pub fn build(self) -> LogicalPlan {
        self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_schema::{DataType, Field, Schema};

    #[test]
    fn chains_nodes_in_call_order() {
        let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, false)]));
        let plan = LogicalPlanBuilder::scan(schema, 10)
            .project(vec![0])
            .limit(5)
            .build();
        assert_eq!(plan.node_name(), "Limit");
        assert_eq!(plan.input().unwrap().node_name(), "Project");
        assert_eq!(plan.input().unwrap().input().unwrap().node_name(), "Scan");
    }
}
