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

/// flattens nested `if let Some(x) = ... { if let Some(y) = ... { ... } }` chains into a
/// single clause list, with an optional trailing `else`.
#[macro_export]
macro_rules! if_let {
    ( $( $p:pat = $e:expr ),+ => $body:block ) => {
        #[allow(unused_parens)]
        if let ( $($p),+ ) = ( $($e),+ ) $body
    };
    ( $( $p:pat = $e:expr ),+ => $body:block else $els:block ) => {
        #[allow(unused_parens)]
        if let ( $($p),+ ) = ( $($e),+ ) $body else $els
    };
}

#[macro_export]
macro_rules! str {
    ($e:expr) => {
        $e.to_string()
    };
}

/// builds an `std::io::Error` of kind `Other` from a formatted message.
#[macro_export]
macro_rules! io_error {
    ($($arg:tt)*) => {
        std::io::Error::new(std::io::ErrorKind::Other, format!($($arg)*))
    };
}
