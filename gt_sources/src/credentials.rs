/*
 * Copyright (c) 2024, United States Government, as represented by the
 * Administrator of the National Aeronautics and Space Administration.
 * All rights reserved.
 *
 * The ODIN - Open Data Integration Framework is licensed under the
 * Apache License, Version 2.0 (the "License"); you may not use this file
 * except in compliance with the License. You may obtain a copy of the
 * License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Flat credential struct read from the environment once at startup. Missing
//! credentials degrade to best-effort; they never crash the process (SPEC_FULL.md §6).

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub opentopography_api_key: Option<String>,
    pub opentopo_username: Option<String>,
    pub opentopo_password: Option<String>,
    pub cdse_token: Option<String>,
    pub cdse_client_id: Option<String>,
    pub cdse_client_secret: Option<String>,
    pub earthdata_username: Option<String>,
}

fn env_first(names: &[&str]) -> Option<String> {
    names.iter().find_map(|n| std::env::var(n).ok()).filter(|v| !v.is_empty())
}

impl Credentials {
    pub fn from_env() -> Self {
        Credentials {
            opentopography_api_key: env_first(&["OPENTOPOGRAPHY_API_KEY", "OPENTOPO_KEY", "OPENTOPO_API_KEY"]),
            opentopo_username: env_first(&["OPENTOPO_USERNAME"]),
            opentopo_password: env_first(&["OPENTOPO_PASSWORD"]),
            cdse_token: env_first(&["CDSE_TOKEN"]),
            cdse_client_id: env_first(&["CDSE_CLIENT_ID"]),
            cdse_client_secret: env_first(&["CDSE_CLIENT_SECRET"]),
            earthdata_username: env_first(&["EARTHDATA_USERNAME"]),
        }
    }

    pub fn has_cdse_client_credentials(&self) -> bool {
        self.cdse_client_id.is_some() && self.cdse_client_secret.is_some()
    }
}
